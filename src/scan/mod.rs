//! Segmented scans: per-query context, row sources and the merging iterator.

/// Per-query scan state.
pub mod context;
/// Scan failures.
pub mod error;
pub mod iter;
pub mod mem;
pub mod range_set;
pub mod row;
/// Row-source contract.
pub mod source;

pub use self::{
    context::ScanContext,
    error::ScanError,
    iter::SegmentedTupleIterator,
    mem::{MemSegmentReader, MemSegmentStore, MemStoreStats},
    range_set::{KeyRange, RangeSet},
    row::{RowKeyDecoder, Tuple},
    source::{SegmentReaderFactory, TupleSource},
};
