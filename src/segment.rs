//! Published segments and per-segment scan ranges.
//!
//! A segment is one immutable physical partition of a cube, typically the
//! build of one time window. Every dictionary-encoded column has its own
//! dictionary per segment, so predicates are tightened once per segment.

use std::{collections::HashMap, fmt, sync::Arc};

use bytes::Bytes;

use crate::{dict::Dictionary, filter::ColumnRef, id::SegmentId, range::ColumnValueRange};

/// Immutable physical partition of the dataset.
#[derive(Clone, Debug)]
pub struct Segment {
    id: SegmentId,
    name: String,
    time_range: Option<(i64, i64)>,
    dictionaries: HashMap<ColumnRef, Arc<Dictionary>>,
}

impl Segment {
    /// Creates a segment without dictionaries.
    pub fn new(id: SegmentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            time_range: None,
            dictionaries: HashMap::new(),
        }
    }

    /// Sets the `[start, end)` time window the segment covers.
    #[must_use]
    pub fn with_time_range(self, start: i64, end: i64) -> Self {
        Segment {
            time_range: Some((start, end)),
            ..self
        }
    }

    /// Registers the dictionary of `column`.
    #[must_use]
    pub fn with_dictionary(mut self, column: ColumnRef, dictionary: Arc<Dictionary>) -> Self {
        self.dictionaries.insert(column, dictionary);
        self
    }

    /// Segment id.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `[start, end)` time window, if the segment is time partitioned.
    pub fn time_range(&self) -> Option<(i64, i64)> {
        self.time_range
    }

    /// Dictionary of `column` in this segment.
    pub fn dictionary(&self, column: &ColumnRef) -> Option<&Arc<Dictionary>> {
        self.dictionaries.get(column)
    }

    /// Copy of `range` tightened against this segment's dictionary.
    ///
    /// Columns without a dictionary here keep their raw literals.
    pub fn pre_evaluate(&self, range: &ColumnValueRange) -> ColumnValueRange {
        let mut range = range.clone();
        if let Some(dict) = self.dictionary(range.column()) {
            range.pre_evaluate_with_dict(dict);
        }
        range
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.id)
    }
}

/// Physical scan request against one segment.
///
/// `start` is inclusive; `stop` is exclusive, and an empty `stop` leaves the
/// range open-ended. Keys compare byte-wise.
#[derive(Clone, Debug)]
pub struct SegmentScanRange {
    segment: Arc<Segment>,
    start: Bytes,
    stop: Bytes,
}

impl SegmentScanRange {
    /// Creates a range over `[start, stop)`.
    pub fn new(segment: Arc<Segment>, start: impl Into<Bytes>, stop: impl Into<Bytes>) -> Self {
        Self {
            segment,
            start: start.into(),
            stop: stop.into(),
        }
    }

    /// Range covering every row of `segment`.
    pub fn full(segment: Arc<Segment>) -> Self {
        Self::new(segment, Bytes::new(), Bytes::new())
    }

    /// Owning segment.
    pub fn segment(&self) -> &Arc<Segment> {
        &self.segment
    }

    /// Inclusive start key.
    pub fn start(&self) -> &[u8] {
        &self.start
    }

    /// Exclusive stop key; empty when unbounded.
    pub fn stop(&self) -> &[u8] {
        &self.stop
    }

    /// Whether `key` falls inside the range.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        key >= self.start() && (self.stop.is_empty() || key < self.stop())
    }
}
