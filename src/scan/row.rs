//! Decoded rows and the row-key codec.
//!
//! A row key is the concatenation of one fixed-width dictionary code per
//! dimension column, in column order. Because codes preserve value order,
//! keys sort the same way the decoded rows do.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};

use crate::{
    dict::{DecodeError, DictCode, Dictionary, EncodeError},
    filter::ColumnRef,
    scan::error::ScanError,
    segment::Segment,
};

/// One decoded logical row; `None` marks a null.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tuple {
    values: Vec<Option<Bytes>>,
}

impl Tuple {
    /// Wraps already decoded values.
    pub fn new(values: Vec<Option<Bytes>>) -> Self {
        Self { values }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tuple has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of column `idx`; `None` when out of bounds or null.
    pub fn get(&self, idx: usize) -> Option<&[u8]> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    /// Whether column `idx` is null.
    pub fn is_null(&self, idx: usize) -> bool {
        matches!(self.values.get(idx), Some(None))
    }

    /// All values in column order.
    pub fn values(&self) -> &[Option<Bytes>] {
        &self.values
    }

    /// Consumes the tuple into its values.
    pub fn into_values(self) -> Vec<Option<Bytes>> {
        self.values
    }
}

impl FromIterator<Option<Bytes>> for Tuple {
    fn from_iter<I: IntoIterator<Item = Option<Bytes>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Decodes row keys into tuples through per-column dictionaries.
#[derive(Clone, Debug, Default)]
pub struct RowKeyDecoder {
    columns: Vec<(ColumnRef, Arc<Dictionary>)>,
}

impl RowKeyDecoder {
    /// Decoder without columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column decoded with `dictionary`.
    #[must_use]
    pub fn with_column(mut self, column: ColumnRef, dictionary: Arc<Dictionary>) -> Self {
        self.columns.push((column, dictionary));
        self
    }

    /// Decoder for `columns` using the dictionaries of `segment`.
    pub fn for_segment(segment: &Segment, columns: &[ColumnRef]) -> Result<Self, ScanError> {
        columns.iter().try_fold(Self::new(), |decoder, column| {
            let dict = segment
                .dictionary(column)
                .ok_or_else(|| ScanError::MissingDictionary {
                    column: column.clone(),
                    segment: segment.id(),
                })?;
            Ok(decoder.with_column(column.clone(), Arc::clone(dict)))
        })
    }

    /// Decoded columns in key order.
    pub fn columns(&self) -> impl ExactSizeIterator<Item = &ColumnRef> {
        self.columns.iter().map(|(column, _)| column)
    }

    /// Byte length of a full row key.
    pub fn key_len(&self) -> usize {
        self.columns.iter().map(|(_, dict)| dict.code_width()).sum()
    }

    /// Decodes one row key.
    pub fn decode(&self, key: &[u8]) -> Result<Tuple, DecodeError> {
        let mut buf = key;
        let mut values = Vec::with_capacity(self.columns.len());
        for (_, dict) in &self.columns {
            let code = dict.code_system().read_fixed(&mut buf)?;
            let value = dict.decode_code(code)?.map(Bytes::copy_from_slice);
            values.push(value);
        }
        if !buf.is_empty() {
            return Err(DecodeError::TrailingBytes {
                remaining: buf.len(),
            });
        }
        Ok(Tuple::new(values))
    }

    /// Encodes one row of values, `None` being null, into a row key.
    pub fn encode_row<V: AsRef<[u8]>>(&self, row: &[Option<V>]) -> Result<Bytes, EncodeError> {
        if row.len() != self.columns.len() {
            return Err(EncodeError::ArityMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        let mut buf = BytesMut::with_capacity(self.key_len());
        for ((_, dict), value) in self.columns.iter().zip(row) {
            let code = match value {
                Some(value) => DictCode::Id(dict.encode(value.as_ref())?),
                None => DictCode::Null,
            };
            dict.code_system().write_fixed(code, &mut buf)?;
        }
        Ok(buf.freeze())
    }
}
