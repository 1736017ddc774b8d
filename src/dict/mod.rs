//! Order-preserving dictionary codec.
//!
//! A [`Dictionary`] assigns ids `0..len` to the distinct values it was built
//! from, in ascending byte order, so `encode(a) < encode(b)` exactly when
//! `a < b`. Values live in a sorted Arrow [`BinaryArray`]; lookups are binary
//! searches over it. Once built the dictionary is immutable and can be shared
//! between concurrent readers behind an `Arc`.

mod code;
mod error;

use std::collections::BTreeSet;

use arrow::{
    array::{Array, BinaryArray, LargeBinaryArray, LargeStringArray, StringArray},
    datatypes::DataType,
};

pub use self::{
    code::{CodeSystem, DictCode, MAX_CODE_WIDTH, NULL_BYTE},
    error::{DecodeError, DictionaryError, EncodeError},
};
use crate::logging::{cubescan_log, LogContext, LogEvent};

/// Immutable, order-preserving mapping between values and fixed-width codes.
#[derive(Clone, Debug)]
pub struct Dictionary {
    values: BinaryArray,
    codes: CodeSystem,
}

impl Dictionary {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> DictionaryBuilder {
        DictionaryBuilder::default()
    }

    /// Builds a dictionary from the distinct non-null values of an Arrow
    /// string or binary array.
    pub fn from_array(array: &dyn Array) -> Result<Self, DictionaryError> {
        let mut builder = DictionaryBuilder::default();
        match array.data_type() {
            DataType::Utf8 => {
                let array = downcast::<StringArray>(array)?;
                builder.extend(array.iter().flatten());
            }
            DataType::LargeUtf8 => {
                let array = downcast::<LargeStringArray>(array)?;
                builder.extend(array.iter().flatten());
            }
            DataType::Binary => {
                let array = downcast::<BinaryArray>(array)?;
                builder.extend(array.iter().flatten());
            }
            DataType::LargeBinary => {
                let array = downcast::<LargeBinaryArray>(array)?;
                builder.extend(array.iter().flatten());
            }
            other => return Err(DictionaryError::UnsupportedType(other.clone())),
        }
        builder.build()
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the dictionary holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Code system matching this dictionary's code width.
    #[must_use]
    pub fn code_system(&self) -> CodeSystem {
        self.codes
    }

    /// Code width in bytes.
    #[must_use]
    pub fn code_width(&self) -> usize {
        self.codes.width()
    }

    /// Id of `value`, failing if the value was never observed.
    pub fn encode(&self, value: &[u8]) -> Result<u32, EncodeError> {
        self.lookup(value).ok_or_else(|| EncodeError::ValueNotFound {
            value: value.to_vec(),
        })
    }

    /// Id of `value`, if present.
    #[must_use]
    pub fn lookup(&self, value: &[u8]) -> Option<u32> {
        let idx = self.lower_bound(value);
        (idx < self.len() && self.values.value(idx) == value).then_some(idx as u32)
    }

    /// Value assigned to `code`.
    pub fn decode(&self, code: u32) -> Result<&[u8], DecodeError> {
        self.get(code).ok_or(DecodeError::CodeOutOfRange {
            code,
            len: self.len(),
        })
    }

    /// Value assigned to `code`, or `None` past the end of the dictionary.
    #[must_use]
    pub fn get(&self, code: u32) -> Option<&[u8]> {
        let idx = code as usize;
        (idx < self.len()).then(|| self.values.value(idx))
    }

    /// Value assigned to `code`, with the null sentinel decoding to `None`.
    pub fn decode_code(&self, code: DictCode) -> Result<Option<&[u8]>, DecodeError> {
        match code {
            DictCode::Id(id) => self.decode(id).map(Some),
            DictCode::Null => Ok(None),
        }
    }

    /// Whether `code` is the null sentinel.
    #[must_use]
    pub fn is_null(&self, code: DictCode) -> bool {
        code.is_null()
    }

    /// Smallest id whose value is `>= value`.
    #[must_use]
    pub fn ceiling_code(&self, value: &[u8]) -> Option<u32> {
        let idx = self.lower_bound(value);
        (idx < self.len()).then_some(idx as u32)
    }

    /// Largest id whose value is `<= value`.
    #[must_use]
    pub fn floor_code(&self, value: &[u8]) -> Option<u32> {
        self.upper_bound(value).checked_sub(1).map(|idx| idx as u32)
    }

    /// Id of the smallest value.
    #[must_use]
    pub fn min_code(&self) -> Option<u32> {
        (!self.is_empty()).then_some(0)
    }

    /// Id of the largest value.
    #[must_use]
    pub fn max_code(&self) -> Option<u32> {
        self.len().checked_sub(1).map(|idx| idx as u32)
    }

    /// Values in id order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        (0..self.len()).map(move |idx| self.values.value(idx))
    }

    // First index whose value is >= `value`.
    fn lower_bound(&self, value: &[u8]) -> usize {
        self.partition_point(|probe| probe < value)
    }

    // First index whose value is > `value`.
    fn upper_bound(&self, value: &[u8]) -> usize {
        self.partition_point(|probe| probe <= value)
    }

    fn partition_point<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(&[u8]) -> bool,
    {
        let (mut lo, mut hi) = (0, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(self.values.value(mid)) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

fn downcast<A: Array + 'static>(array: &dyn Array) -> Result<&A, DictionaryError> {
    array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| DictionaryError::UnsupportedType(array.data_type().clone()))
}

/// Collects observed values before a [`Dictionary`] is frozen.
#[derive(Clone, Debug, Default)]
pub struct DictionaryBuilder {
    values: BTreeSet<Vec<u8>>,
}

impl DictionaryBuilder {
    /// Records one observed value; duplicates are merged.
    pub fn add_value<V: AsRef<[u8]>>(&mut self, value: V) -> &mut Self {
        let value = value.as_ref();
        if !self.values.contains(value) {
            self.values.insert(value.to_vec());
        }
        self
    }

    /// Records every value yielded by `values`.
    pub fn extend<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        for value in values {
            self.add_value(value);
        }
        self
    }

    /// Number of distinct values recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Freezes the recorded values into a dictionary.
    pub fn build(self) -> Result<Dictionary, DictionaryError> {
        let len = self.values.len();
        let codes = CodeSystem::for_len(len).ok_or(DictionaryError::TooManyValues { len })?;
        let values = BinaryArray::from_iter_values(self.values.iter());
        cubescan_log!(
            LogContext::Dictionary,
            LogEvent::DictionaryBuilt,
            "values={} code_width={}",
            len,
            codes.width(),
        );
        Ok(Dictionary { values, codes })
    }
}
