use std::sync::Arc;

use crate::{
    scan::{error::ScanError, row::Tuple},
    segment::{Segment, SegmentScanRange},
};

/// Pull-based source of decoded rows for one segment.
pub trait TupleSource {
    /// Whether another row is available.
    fn has_next(&mut self) -> Result<bool, ScanError>;

    /// Next row; [`ScanError::SourceExhausted`] when none is left.
    fn next(&mut self) -> Result<Tuple, ScanError>;

    /// Releases the underlying resources. Calling it twice is a no-op.
    fn close(&mut self);
}

/// Opens a [`TupleSource`] over the scan ranges of one segment.
pub trait SegmentReaderFactory {
    /// Row source produced per segment.
    type Reader: TupleSource;

    /// Opens a reader over `ranges`, all of which belong to `segment`.
    fn open(
        &self,
        segment: &Arc<Segment>,
        ranges: &[SegmentScanRange],
    ) -> Result<Self::Reader, ScanError>;
}

impl<F> SegmentReaderFactory for &F
where
    F: SegmentReaderFactory + ?Sized,
{
    type Reader = F::Reader;

    fn open(
        &self,
        segment: &Arc<Segment>,
        ranges: &[SegmentScanRange],
    ) -> Result<Self::Reader, ScanError> {
        (**self).open(segment, ranges)
    }
}

impl<T> TupleSource for Box<T>
where
    T: TupleSource + ?Sized,
{
    fn has_next(&mut self) -> Result<bool, ScanError> {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<Tuple, ScanError> {
        (**self).next()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
