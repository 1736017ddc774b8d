//! Merges per-segment row sources into one result stream.
//!
//! Scan ranges are grouped by owning segment; segments are visited in the
//! order they first appear and each one's reader is opened only after the
//! previous reader ran dry. Limit, partial-result and threshold policies are
//! checked before every row against the counters kept in [`ScanContext`].

use std::{collections::HashMap, iter::FusedIterator, mem, sync::Arc};

use crate::{
    id::SegmentId,
    logging::{cubescan_log, LogContext, LogEvent},
    scan::{
        context::ScanContext,
        error::ScanError,
        row::Tuple,
        source::{SegmentReaderFactory, TupleSource},
    },
    segment::{Segment, SegmentScanRange},
};

struct SegmentScan {
    segment: Arc<Segment>,
    ranges: Vec<SegmentScanRange>,
}

// Why a scan ended early. Kept so later calls keep reporting it.
enum Fault {
    Threshold { threshold: u64 },
    Failed { cause: String },
}

impl Fault {
    fn to_error(&self) -> ScanError {
        match self {
            Fault::Threshold { threshold } => ScanError::ThresholdExceeded {
                threshold: *threshold,
            },
            Fault::Failed { cause } => ScanError::Aborted {
                cause: cause.clone(),
            },
        }
    }
}

impl From<&ScanError> for Fault {
    fn from(err: &ScanError) -> Self {
        match err {
            ScanError::ThresholdExceeded { threshold } => Fault::Threshold {
                threshold: *threshold,
            },
            ScanError::Aborted { cause } => Fault::Failed {
                cause: cause.clone(),
            },
            other => Fault::Failed {
                cause: other.to_string(),
            },
        }
    }
}

enum IterState<R> {
    Init,
    Scanning { index: usize, reader: R, rows: u64 },
    Done,
    Faulted(Fault),
}

/// Pull-based iterator over the rows of several segments.
///
/// Borrows the query's [`ScanContext`] mutably for its whole lifetime; read
/// the counters through [`SegmentedTupleIterator::context`] or after the
/// iterator is dropped.
pub struct SegmentedTupleIterator<'ctx, F>
where
    F: SegmentReaderFactory,
{
    ctx: &'ctx mut ScanContext,
    factory: F,
    segments: Vec<SegmentScan>,
    state: IterState<F::Reader>,
}

impl<'ctx, F> SegmentedTupleIterator<'ctx, F>
where
    F: SegmentReaderFactory,
{
    /// Creates an iterator over `ranges`. No reader is opened yet.
    pub fn new<I>(ranges: I, factory: F, ctx: &'ctx mut ScanContext) -> Self
    where
        I: IntoIterator<Item = SegmentScanRange>,
    {
        let mut segments: Vec<SegmentScan> = Vec::new();
        let mut positions: HashMap<SegmentId, usize> = HashMap::new();
        for range in ranges {
            let id = range.segment().id();
            match positions.get(&id) {
                Some(&pos) => segments[pos].ranges.push(range),
                None => {
                    positions.insert(id, segments.len());
                    segments.push(SegmentScan {
                        segment: Arc::clone(range.segment()),
                        ranges: vec![range],
                    });
                }
            }
        }
        Self {
            ctx,
            factory,
            segments,
            state: IterState::Init,
        }
    }

    /// The query's scan context.
    pub fn context(&self) -> &ScanContext {
        &*self.ctx
    }

    /// Number of distinct segments the iterator will visit.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Whether another row can be emitted.
    ///
    /// Returns `Ok(false)` once the limit is met or a partial result is cut
    /// off, and fails with [`ScanError::ThresholdExceeded`] once the row
    /// threshold is hit. Any failure is terminal: the open reader is closed
    /// and every later call fails too. A threshold failure repeats itself,
    /// anything else repeats as [`ScanError::Aborted`].
    pub fn has_next(&mut self) -> Result<bool, ScanError> {
        self.check().map_err(|err| self.fault(err))
    }

    /// Emits the next row, or `None` when the scan is over.
    pub fn next_tuple(&mut self) -> Result<Option<Tuple>, ScanError> {
        if !self.has_next()? {
            return Ok(None);
        }
        let IterState::Scanning { reader, rows, .. } = &mut self.state else {
            return Ok(None);
        };
        match reader.next() {
            Ok(tuple) => {
                *rows += 1;
                self.ctx.record_row();
                Ok(Some(tuple))
            }
            Err(err) => Err(self.fault(err)),
        }
    }

    /// Closes the active reader. Segments never opened need no release.
    ///
    /// Calling it again is a no-op; a faulted iterator stays faulted.
    pub fn close(&mut self) {
        self.release();
    }

    fn check(&mut self) -> Result<bool, ScanError> {
        match &self.state {
            IterState::Done => return Ok(false),
            IterState::Faulted(fault) => return Err(fault.to_error()),
            IterState::Init | IterState::Scanning { .. } => {}
        }

        if self.ctx.limit_reached() {
            return Ok(false);
        }

        if self.ctx.partial_result_reached() {
            if !self.ctx.partial_result_returned() {
                cubescan_log!(
                    LogContext::Scan,
                    LogEvent::PartialResultReturned,
                    "scanned={} partial_limit={}",
                    self.ctx.scanned(),
                    self.ctx.partial_result_limit(),
                );
                self.ctx.set_partial_result_returned();
            }
            return Ok(false);
        }

        if self.ctx.threshold_reached() {
            let threshold = self.ctx.threshold();
            cubescan_log!(
                LogContext::Scan,
                LogEvent::ScanThresholdExceeded,
                "scanned={} threshold={}",
                self.ctx.scanned(),
                threshold,
            );
            return Err(ScanError::ThresholdExceeded { threshold });
        }

        self.advance()
    }

    // Moves to the first segment with a pending row, opening readers lazily
    // and closing the drained ones.
    fn advance(&mut self) -> Result<bool, ScanError> {
        loop {
            let next = match &mut self.state {
                IterState::Scanning { index, reader, .. } => {
                    if reader.has_next()? {
                        return Ok(true);
                    }
                    *index + 1
                }
                IterState::Init => 0,
                IterState::Done | IterState::Faulted(_) => return Ok(false),
            };
            self.release();

            let Some(scan) = self.segments.get(next) else {
                return Ok(false);
            };
            let reader = self.factory.open(&scan.segment, &scan.ranges)?;
            cubescan_log!(
                LogContext::Scan,
                LogEvent::SegmentOpened,
                "segment={} ranges={} position={}/{}",
                scan.segment,
                scan.ranges.len(),
                next + 1,
                self.segments.len(),
            );
            self.state = IterState::Scanning {
                index: next,
                reader,
                rows: 0,
            };
        }
    }

    // Ends the scan on `err`: the open reader is closed and the iterator
    // stays faulted. The first failure wins.
    fn fault(&mut self, err: ScanError) -> ScanError {
        if matches!(self.state, IterState::Faulted(_)) {
            return err;
        }
        self.release();
        if !err.is_threshold_exceeded() {
            cubescan_log!(
                LogContext::Scan,
                LogEvent::ScanFailed,
                "scanned={} error={}",
                self.ctx.scanned(),
                err,
            );
        }
        self.state = IterState::Faulted(Fault::from(&err));
        err
    }

    // Closes the open reader, if any, and leaves the iterator `Done` unless
    // it already faulted.
    fn release(&mut self) {
        if matches!(self.state, IterState::Faulted(_)) {
            return;
        }
        let state = mem::replace(&mut self.state, IterState::Done);
        if let IterState::Scanning {
            index,
            mut reader,
            rows,
        } = state
        {
            reader.close();
            if let Some(scan) = self.segments.get(index) {
                cubescan_log!(
                    LogContext::Scan,
                    LogEvent::SegmentClosed,
                    "segment={} rows={}",
                    scan.segment,
                    rows,
                );
            }
        }
    }
}

impl<F> Iterator for SegmentedTupleIterator<'_, F>
where
    F: SegmentReaderFactory,
{
    type Item = Result<Tuple, ScanError>;

    // Yields the failure once, then ends.
    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, IterState::Faulted(_)) {
            return None;
        }
        self.next_tuple().transpose()
    }
}

impl<F> FusedIterator for SegmentedTupleIterator<'_, F> where F: SegmentReaderFactory {}

impl<F> Drop for SegmentedTupleIterator<'_, F>
where
    F: SegmentReaderFactory,
{
    fn drop(&mut self) {
        self.close();
    }
}
