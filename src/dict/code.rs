//! Dictionary codes and their byte encodings.
//!
//! A code is written big-endian in a fixed number of bytes chosen per
//! dictionary, so comparing encoded codes byte-wise gives the same answer as
//! comparing the values they stand for. The all-`0xFF` pattern of a width is
//! reserved for null and therefore sorts after every real value.

use std::cmp::Ordering;

use bytes::{Buf, BufMut};

use super::{DecodeError, EncodeError};

/// Byte that fills every position of the null sentinel.
pub const NULL_BYTE: u8 = 0xFF;

/// Widest code the crate produces, in bytes.
pub const MAX_CODE_WIDTH: usize = 4;

/// A dictionary code: either an assigned id or the null sentinel.
///
/// `Null` orders after every id, the same way its encoding does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DictCode {
    /// Id assigned to a value at build time.
    Id(u32),
    /// No value.
    Null,
}

impl DictCode {
    /// Returns true for the null sentinel.
    #[must_use]
    pub fn is_null(self) -> bool {
        matches!(self, DictCode::Null)
    }

    /// Returns the assigned id, if any.
    #[must_use]
    pub fn id(self) -> Option<u32> {
        match self {
            DictCode::Id(id) => Some(id),
            DictCode::Null => None,
        }
    }
}

impl From<u32> for DictCode {
    fn from(id: u32) -> Self {
        DictCode::Id(id)
    }
}

/// Encoder/decoder for codes of one fixed byte width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeSystem {
    width: usize,
}

impl CodeSystem {
    /// Creates a code system for `width` bytes; `None` unless `1..=4`.
    #[must_use]
    pub fn new(width: usize) -> Option<Self> {
        (1..=MAX_CODE_WIDTH)
            .contains(&width)
            .then_some(Self { width })
    }

    /// Narrowest code system able to address `len` distinct ids.
    #[must_use]
    pub fn for_len(len: usize) -> Option<Self> {
        (1..=MAX_CODE_WIDTH)
            .find(|width| len as u64 <= null_id(*width))
            .map(|width| Self { width })
    }

    /// Code width in bytes.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether every byte of `bytes` is the null byte.
    #[must_use]
    pub fn is_null(bytes: &[u8]) -> bool {
        bytes.iter().all(|b| *b == NULL_BYTE)
    }

    /// Byte-wise comparison of two encoded codes.
    #[must_use]
    pub fn compare(a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    /// Writes `code` as exactly `width` big-endian bytes.
    pub fn write_fixed<B: BufMut>(&self, code: DictCode, buf: &mut B) -> Result<(), EncodeError> {
        match code {
            DictCode::Null => buf.put_bytes(NULL_BYTE, self.width),
            DictCode::Id(id) => {
                if u64::from(id) >= null_id(self.width) {
                    return Err(EncodeError::CodeOutOfWidth {
                        code: id,
                        width: self.width,
                    });
                }
                buf.put_slice(&id.to_be_bytes()[MAX_CODE_WIDTH - self.width..]);
            }
        }
        Ok(())
    }

    /// Reads a code written by [`CodeSystem::write_fixed`].
    pub fn read_fixed<B: Buf>(&self, buf: &mut B) -> Result<DictCode, DecodeError> {
        if buf.remaining() < self.width {
            return Err(DecodeError::Truncated {
                expected: self.width,
                actual: buf.remaining(),
            });
        }
        let mut raw = [0u8; MAX_CODE_WIDTH];
        buf.copy_to_slice(&mut raw[MAX_CODE_WIDTH - self.width..]);
        if Self::is_null(&raw[MAX_CODE_WIDTH - self.width..]) {
            return Ok(DictCode::Null);
        }
        Ok(DictCode::Id(u32::from_be_bytes(raw)))
    }

    /// Writes `code` with a `u16` length prefix.
    pub fn serialize<B: BufMut>(&self, code: DictCode, buf: &mut B) -> Result<(), EncodeError> {
        buf.put_u16(self.width as u16);
        self.write_fixed(code, buf)
    }

    /// Reads a code written by [`CodeSystem::serialize`].
    ///
    /// A payload made only of null bytes decodes to [`DictCode::Null`] no
    /// matter which width it declares.
    pub fn deserialize<B: Buf>(&self, buf: &mut B) -> Result<DictCode, DecodeError> {
        if buf.remaining() < 2 {
            return Err(DecodeError::Truncated {
                expected: 2,
                actual: buf.remaining(),
            });
        }
        let len = usize::from(buf.get_u16());
        if buf.remaining() < len {
            return Err(DecodeError::Truncated {
                expected: len,
                actual: buf.remaining(),
            });
        }
        let payload = buf.copy_to_bytes(len);
        if Self::is_null(&payload) {
            return Ok(DictCode::Null);
        }
        if len != self.width {
            return Err(DecodeError::WidthMismatch {
                expected: self.width,
                actual: len,
            });
        }
        self.read_fixed(&mut &payload[..])
    }
}

// Numeric value of the all-0xFF pattern for `width` bytes.
fn null_id(width: usize) -> u64 {
    (1u64 << (8 * width)) - 1
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn width_grows_with_cardinality() {
        assert_eq!(CodeSystem::for_len(0).map(|c| c.width()), Some(1));
        assert_eq!(CodeSystem::for_len(255).map(|c| c.width()), Some(1));
        assert_eq!(CodeSystem::for_len(256).map(|c| c.width()), Some(2));
        assert_eq!(CodeSystem::for_len(65_535).map(|c| c.width()), Some(2));
        assert_eq!(CodeSystem::for_len(65_536).map(|c| c.width()), Some(3));
        assert!(CodeSystem::new(0).is_none());
        assert!(CodeSystem::new(5).is_none());
    }

    #[test]
    fn fixed_encoding_orders_like_ids() {
        let codes = CodeSystem::new(2).unwrap();
        let mut encoded = Vec::new();
        for code in [DictCode::Id(0), DictCode::Id(1), DictCode::Id(300), DictCode::Null] {
            let mut buf = BytesMut::new();
            codes.write_fixed(code, &mut buf).unwrap();
            assert_eq!(buf.len(), 2);
            encoded.push(buf.freeze());
        }
        for pair in encoded.windows(2) {
            assert_eq!(CodeSystem::compare(&pair[0], &pair[1]), Ordering::Less);
        }
        assert_eq!(&encoded[3][..], &[NULL_BYTE, NULL_BYTE]);
    }

    #[test]
    fn fixed_encoding_rejects_sentinel_ids() {
        let codes = CodeSystem::new(1).unwrap();
        let mut buf = BytesMut::new();
        assert_eq!(
            codes.write_fixed(DictCode::Id(255), &mut buf),
            Err(EncodeError::CodeOutOfWidth {
                code: 255,
                width: 1
            })
        );
    }

    #[test]
    fn serialized_codes_read_back() {
        let codes = CodeSystem::new(3).unwrap();
        let mut buf = BytesMut::new();
        codes.serialize(DictCode::Id(70_000), &mut buf).unwrap();
        codes.serialize(DictCode::Null, &mut buf).unwrap();

        let mut reader = buf.freeze();
        assert_eq!(codes.deserialize(&mut reader), Ok(DictCode::Id(70_000)));
        assert_eq!(codes.deserialize(&mut reader), Ok(DictCode::Null));
        assert!(!reader.has_remaining());
    }

    #[test]
    fn deserialize_reports_bad_input() {
        let codes = CodeSystem::new(2).unwrap();

        let mut short: &[u8] = &[0, 2, 1];
        assert_eq!(
            codes.deserialize(&mut short),
            Err(DecodeError::Truncated {
                expected: 2,
                actual: 1
            })
        );

        let mut wide: &[u8] = &[0, 3, 0, 0, 1];
        assert_eq!(
            codes.deserialize(&mut wide),
            Err(DecodeError::WidthMismatch {
                expected: 2,
                actual: 3
            })
        );

        // A foreign-width null is still null.
        let mut null: &[u8] = &[0, 1, NULL_BYTE];
        assert_eq!(codes.deserialize(&mut null), Ok(DictCode::Null));
    }

    #[test]
    fn null_detection() {
        assert!(CodeSystem::is_null(&[]));
        assert!(CodeSystem::is_null(&[NULL_BYTE, NULL_BYTE]));
        assert!(!CodeSystem::is_null(&[NULL_BYTE, 0]));
        assert!(DictCode::Null.is_null());
        assert_eq!(DictCode::from(7).id(), Some(7));
        assert!(DictCode::Id(u32::MAX) < DictCode::Null);
    }
}
