#![deny(missing_docs)]
//! Query-time predicate and scan core for a dictionary-encoded columnar cube
//! store.
//!
//! Dimension values are stored as fixed-width codes from per-segment,
//! order-preserving [`Dictionary`] instances. Query filters become
//! [`ColumnValueRange`]s, which are tightened against each segment's
//! dictionary before any row is read, and the rows of every selected segment
//! are streamed back through one [`SegmentedTupleIterator`] that enforces the
//! query's limit, threshold and partial-result policies.
//!
//! ```
//! use std::sync::Arc;
//!
//! use cubescan::{
//!     ColumnRef, ColumnValueRange, Dictionary, FilterOperator, Segment, SegmentIdGenerator,
//! };
//!
//! let country = ColumnRef::new("sales", 1, "country");
//! let mut builder = Dictionary::builder();
//! builder.extend(["CN", "US"]);
//! let dict = Arc::new(builder.build().unwrap());
//!
//! let segment = Segment::new(SegmentIdGenerator::new().generate(), "2024-01")
//!     .with_dictionary(country.clone(), dict);
//! let range = ColumnValueRange::new(country, FilterOperator::Lt, ["Other"]).unwrap();
//! let tightened = segment.pre_evaluate(&range);
//! assert_eq!(tightened.end_value(), Some(&b"CN"[..]));
//! ```

mod logging;

pub mod dict;
pub mod filter;

/// Segment identifiers.
pub mod id;

/// Scan configuration.
pub mod option;

pub mod range;
pub mod scan;
pub mod segment;

pub use crate::{
    dict::{
        CodeSystem, DecodeError, DictCode, Dictionary, DictionaryBuilder, DictionaryError,
        EncodeError,
    },
    filter::{ColumnRef, CompareFilter, FilterOperator},
    id::{SegmentId, SegmentIdGenerator},
    option::ScanOptions,
    range::{CodeRange, CodedValue, ColumnValueRange, RangeError, RangeState},
    scan::{
        KeyRange, MemSegmentStore, RangeSet, RowKeyDecoder, ScanContext, ScanError,
        SegmentReaderFactory, SegmentedTupleIterator, Tuple, TupleSource,
    },
    segment::{Segment, SegmentScanRange},
};
