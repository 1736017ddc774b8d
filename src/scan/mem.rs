//! In-memory row storage implementing the row-source contract.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use bytes::Bytes;

use crate::{
    id::SegmentId,
    scan::{
        error::ScanError,
        row::{RowKeyDecoder, Tuple},
        source::{SegmentReaderFactory, TupleSource},
    },
    segment::{Segment, SegmentScanRange},
};

/// Reader open/close counters shared by a store and its readers.
#[derive(Debug, Default)]
pub struct MemStoreStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl MemStoreStats {
    /// Readers opened so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }

    /// Readers closed so far.
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::Relaxed)
    }

    /// Readers opened but not yet closed.
    pub fn open_readers(&self) -> usize {
        self.opened().saturating_sub(self.closed())
    }
}

#[derive(Debug)]
struct MemSegment {
    decoder: RowKeyDecoder,
    rows: Vec<Bytes>,
}

/// Row keys of several segments held in memory, sorted per segment.
#[derive(Debug, Default)]
pub struct MemSegmentStore {
    segments: HashMap<SegmentId, MemSegment>,
    stats: Arc<MemStoreStats>,
}

impl MemSegmentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the row keys of `segment`, replacing any previous rows.
    pub fn insert<I, K>(&mut self, segment: &Segment, decoder: RowKeyDecoder, rows: I)
    where
        I: IntoIterator<Item = K>,
        K: Into<Bytes>,
    {
        let mut rows: Vec<Bytes> = rows.into_iter().map(Into::into).collect();
        rows.sort();
        self.segments
            .insert(segment.id(), MemSegment { decoder, rows });
    }

    /// Number of rows stored for `segment`.
    pub fn row_count(&self, segment: SegmentId) -> usize {
        self.segments.get(&segment).map_or(0, |s| s.rows.len())
    }

    /// Open/close counters.
    pub fn stats(&self) -> &Arc<MemStoreStats> {
        &self.stats
    }
}

impl SegmentReaderFactory for MemSegmentStore {
    type Reader = MemSegmentReader;

    fn open(
        &self,
        segment: &Arc<Segment>,
        ranges: &[SegmentScanRange],
    ) -> Result<Self::Reader, ScanError> {
        let stored = self
            .segments
            .get(&segment.id())
            .ok_or_else(|| ScanError::UnknownSegment {
                segment: segment.id(),
            })?;
        let rows = stored
            .rows
            .iter()
            .filter(|key| ranges.iter().any(|range| range.contains_key(key)))
            .cloned()
            .collect();
        self.stats.opened.fetch_add(1, Ordering::Relaxed);
        Ok(MemSegmentReader {
            segment: segment.id(),
            decoder: stored.decoder.clone(),
            rows,
            closed: false,
            stats: Arc::clone(&self.stats),
        })
    }
}

/// Reader over the in-range rows of one stored segment.
#[derive(Debug)]
pub struct MemSegmentReader {
    segment: SegmentId,
    decoder: RowKeyDecoder,
    rows: VecDeque<Bytes>,
    closed: bool,
    stats: Arc<MemStoreStats>,
}

impl TupleSource for MemSegmentReader {
    fn has_next(&mut self) -> Result<bool, ScanError> {
        Ok(!self.closed && !self.rows.is_empty())
    }

    fn next(&mut self) -> Result<Tuple, ScanError> {
        let key = match self.rows.pop_front() {
            Some(key) if !self.closed => key,
            _ => {
                return Err(ScanError::SourceExhausted {
                    segment: self.segment,
                })
            }
        };
        Ok(self.decoder.decode(&key)?)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.rows.clear();
            self.stats.closed.fetch_add(1, Ordering::Relaxed);
        }
    }
}
