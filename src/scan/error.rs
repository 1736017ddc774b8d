use std::error::Error;

use thiserror::Error;

use crate::{dict::DecodeError, filter::ColumnRef, id::SegmentId};

/// Failures surfaced while iterating segment rows.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan read as many rows as its threshold allows.
    #[error(
        "Scan row count exceeded threshold: {threshold}, please add filter condition to narrow \
         down backend scan range, like where clause."
    )]
    ThresholdExceeded {
        /// Configured threshold.
        threshold: u64,
    },
    /// `next` was called on a row source with nothing left.
    #[error("row source of segment {segment} is exhausted")]
    SourceExhausted {
        /// Segment whose source was drained.
        segment: SegmentId,
    },
    /// The row source does not know the segment.
    #[error("unknown segment {segment}")]
    UnknownSegment {
        /// Requested segment.
        segment: SegmentId,
    },
    /// A decoded column has no dictionary in the segment.
    #[error("segment {segment} has no dictionary for column {column}")]
    MissingDictionary {
        /// Column without a dictionary.
        column: ColumnRef,
        /// Segment that was searched.
        segment: SegmentId,
    },
    /// Row bytes could not be decoded.
    #[error("row decode failed: {0}")]
    Decode(#[from] DecodeError),
    /// Failure reported by an external row source.
    #[error("row source failed: {0}")]
    Source(#[source] Box<dyn Error + Send + Sync>),
    /// The scan already failed; reported by every call after the first
    /// failure.
    #[error("scan aborted after an earlier failure: {cause}")]
    Aborted {
        /// Message of the failure that ended the scan.
        cause: String,
    },
}

impl ScanError {
    /// Whether the scan stopped at its row threshold.
    pub fn is_threshold_exceeded(&self) -> bool {
        matches!(self, ScanError::ThresholdExceeded { .. })
    }
}
