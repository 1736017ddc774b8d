use arrow::datatypes::DataType;
use thiserror::Error;

/// Raised when a value or code cannot be turned into its encoded form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The value was never observed while the dictionary was built.
    #[error("value `{}` is not present in the dictionary", String::from_utf8_lossy(.value))]
    ValueNotFound {
        /// Raw value that was looked up.
        value: Vec<u8>,
    },
    /// The id collides with the null sentinel of the target width.
    #[error("code {code} does not fit in {width} byte(s)")]
    CodeOutOfWidth {
        /// Offending id.
        code: u32,
        /// Code width in bytes.
        width: usize,
    },
    /// A row was encoded with the wrong number of column values.
    #[error("row has {got} value(s), expected {expected}")]
    ArityMismatch {
        /// Number of columns known to the encoder.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },
}

/// Raised when encoded bytes or codes cannot be mapped back to values.
///
/// Always indicates a mismatch between the encoder and the decoder; callers
/// propagate it instead of recovering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The id lies outside the range the dictionary was built with.
    #[error("code {code} is out of range for a dictionary of {len} value(s)")]
    CodeOutOfRange {
        /// Offending id.
        code: u32,
        /// Number of values in the dictionary.
        len: usize,
    },
    /// The buffer ended before a complete code could be read.
    #[error("truncated code: expected {expected} byte(s), {actual} available")]
    Truncated {
        /// Bytes required.
        expected: usize,
        /// Bytes remaining in the buffer.
        actual: usize,
    },
    /// A serialized code declared a width different from the code system's.
    #[error("serialized code has width {actual}, expected {expected}")]
    WidthMismatch {
        /// Width of the code system.
        expected: usize,
        /// Width declared by the length prefix.
        actual: usize,
    },
    /// Bytes were left over after every column of a row was decoded.
    #[error("{remaining} trailing byte(s) after row key")]
    TrailingBytes {
        /// Number of unread bytes.
        remaining: usize,
    },
}

/// Raised while building a dictionary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DictionaryError {
    /// Only string and binary Arrow arrays carry dictionary values.
    #[error("cannot build a dictionary from arrow type {0:?}")]
    UnsupportedType(DataType),
    /// The number of distinct values exceeds what a 4-byte code can address.
    #[error("{len} distinct values exceed the dictionary code space")]
    TooManyValues {
        /// Number of distinct values offered.
        len: usize,
    },
}
