//! Common fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use cubescan::{
    ColumnRef, Dictionary, MemSegmentStore, RowKeyDecoder, Segment, SegmentIdGenerator,
    SegmentScanRange,
};

/// A store of segments whose rows carry a `day` value and a nullable `flag`.
pub struct Cube {
    pub store: MemSegmentStore,
    pub segments: Vec<Arc<Segment>>,
}

pub fn day() -> ColumnRef {
    ColumnRef::new("events", 0, "day")
}

pub fn flag() -> ColumnRef {
    ColumnRef::new("events", 1, "flag")
}

/// Label of row `row` in segment `segment`.
pub fn label(segment: usize, row: usize) -> String {
    format!("s{segment}-{row:03}")
}

/// Builds one segment per entry of `rows_per_segment`. Even rows carry the
/// flag `"y"`, odd rows a null flag.
pub fn cube(rows_per_segment: &[usize]) -> Cube {
    let ids = SegmentIdGenerator::new();
    let mut store = MemSegmentStore::new();
    let mut segments = Vec::with_capacity(rows_per_segment.len());
    for (s, &rows) in rows_per_segment.iter().enumerate() {
        let mut days = Dictionary::builder();
        days.extend((0..rows).map(|r| label(s, r)));
        let days = Arc::new(days.build().expect("day dictionary"));
        let mut flags = Dictionary::builder();
        flags.add_value("y");
        let flags = Arc::new(flags.build().expect("flag dictionary"));

        let segment = Arc::new(
            Segment::new(ids.generate(), format!("seg-{s}"))
                .with_time_range(s as i64 * 100, (s as i64 + 1) * 100)
                .with_dictionary(day(), Arc::clone(&days))
                .with_dictionary(flag(), Arc::clone(&flags)),
        );
        let decoder =
            RowKeyDecoder::for_segment(&segment, &[day(), flag()]).expect("segment decoder");
        let keys: Vec<_> = (0..rows)
            .map(|r| {
                let flag = (r % 2 == 0).then_some("y".to_string());
                decoder
                    .encode_row(&[Some(label(s, r)), flag])
                    .expect("row key")
            })
            .collect();
        store.insert(&segment, decoder, keys);
        segments.push(segment);
    }
    Cube { store, segments }
}

impl Cube {
    /// One full-range scan per segment, in segment order.
    pub fn full_ranges(&self) -> Vec<SegmentScanRange> {
        self.segments
            .iter()
            .map(|segment| SegmentScanRange::full(Arc::clone(segment)))
            .collect()
    }
}
