//! Code ranges and normalized range sets.
//!
//! Tightened predicates leave the crate as sets of code ranges; scan-range
//! construction turns each range into start/stop row keys. The types are
//! generic so tests and callers can use them over any ordered key.

use std::{cmp::Ordering, ops::Bound};

/// A range with owned bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRange<K> {
    /// Start bound (inclusive/exclusive/unbounded).
    pub start: Bound<K>,
    /// End bound (inclusive/exclusive/unbounded).
    pub end: Bound<K>,
}

impl<K> KeyRange<K> {
    /// Create an unbounded range (all keys).
    pub fn all() -> Self {
        Self {
            start: Bound::Unbounded,
            end: Bound::Unbounded,
        }
    }

    /// Create a new range from explicit bounds.
    pub fn new(start: Bound<K>, end: Bound<K>) -> Self {
        Self { start, end }
    }
}

impl<K: Ord> KeyRange<K> {
    /// Whether this range contains `key`.
    pub fn contains(&self, key: &K) -> bool {
        let above_start = match &self.start {
            Bound::Unbounded => true,
            Bound::Included(bound) => key >= bound,
            Bound::Excluded(bound) => key > bound,
        };
        above_start
            && match &self.end {
                Bound::Unbounded => true,
                Bound::Included(bound) => key <= bound,
                Bound::Excluded(bound) => key < bound,
            }
    }

    /// Whether no key can fall inside the bounds.
    pub fn is_empty(&self) -> bool {
        is_empty_range(&self.start, &self.end)
    }
}

/// A normalized set of disjoint, sorted ranges.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RangeSet<K> {
    ranges: Vec<KeyRange<K>>,
}

impl<K: Ord> RangeSet<K> {
    /// Create an empty range set (matches nothing).
    pub fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Create a set containing a single unbounded range (matches all keys).
    pub fn all() -> Self {
        Self {
            ranges: vec![KeyRange::all()],
        }
    }

    /// Construct from raw ranges: drop empty ones, sort, and merge overlaps.
    pub fn from_ranges(mut ranges: Vec<KeyRange<K>>) -> Self {
        ranges.retain(|r| !r.is_empty());
        ranges.sort_by(|a, b| cmp_lower(&a.start, &b.start));
        let mut out: Vec<KeyRange<K>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            if let Some(last) = out.last_mut() {
                if overlaps_or_adjacent(&last.end, &range.start) {
                    let end = std::mem::replace(&mut last.end, Bound::Unbounded);
                    last.end = max_upper(end, range.end);
                    continue;
                }
            }
            out.push(range);
        }
        Self { ranges: out }
    }

    /// Whether the set has no ranges.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterate over contained ranges.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &KeyRange<K>> {
        self.ranges.iter()
    }

    /// Borrow the underlying normalized ranges as a slice.
    pub fn as_slice(&self) -> &[KeyRange<K>] {
        &self.ranges
    }

    /// Whether the set contains `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.ranges.iter().any(|range| range.contains(key))
    }

    /// Union with another set.
    pub fn union(self, other: RangeSet<K>) -> RangeSet<K> {
        let mut all = self.ranges;
        all.extend(other.ranges);
        RangeSet::from_ranges(all)
    }

    /// Intersection with another set.
    pub fn intersect(self, other: RangeSet<K>) -> RangeSet<K>
    where
        K: Clone,
    {
        let mut out = Vec::new();
        for a in &self.ranges {
            for b in &other.ranges {
                let start = max_lower(a.start.clone(), b.start.clone());
                let end = min_upper(a.end.clone(), b.end.clone());
                out.push(KeyRange::new(start, end));
            }
        }
        RangeSet::from_ranges(out)
    }

    /// Complement over the full key domain `(-∞, +∞)`.
    pub fn complement(self) -> RangeSet<K> {
        let mut gaps = Vec::with_capacity(self.ranges.len() + 1);
        let mut gap_start = Some(Bound::Unbounded);
        for range in self.ranges {
            let Some(start) = gap_start.take() else {
                break;
            };
            if let Some(gap_end) = flip(range.start) {
                gaps.push(KeyRange::new(start, gap_end));
            }
            gap_start = flip(range.end);
        }
        if let Some(start) = gap_start {
            gaps.push(KeyRange::new(start, Bound::Unbounded));
        }
        RangeSet::from_ranges(gaps)
    }
}

// The bound on the other side of the same key; `None` for unbounded.
fn flip<K>(bound: Bound<K>) -> Option<Bound<K>> {
    match bound {
        Bound::Included(k) => Some(Bound::Excluded(k)),
        Bound::Excluded(k) => Some(Bound::Included(k)),
        Bound::Unbounded => None,
    }
}

// Lower bounds: Unbounded < Included(x) < Excluded(x) < Included(y) for x < y.
fn cmp_lower<K: Ord>(a: &Bound<K>, b: &Bound<K>) -> Ordering {
    use Bound as B;
    match (a, b) {
        (B::Unbounded, B::Unbounded) => Ordering::Equal,
        (B::Unbounded, _) => Ordering::Less,
        (_, B::Unbounded) => Ordering::Greater,
        (B::Included(x), B::Included(y)) | (B::Excluded(x), B::Excluded(y)) => x.cmp(y),
        (B::Included(x), B::Excluded(y)) => x.cmp(y).then(Ordering::Less),
        (B::Excluded(x), B::Included(y)) => x.cmp(y).then(Ordering::Greater),
    }
}

// Upper bounds: Excluded(x) < Included(x) < Excluded(y) for x < y; Unbounded last.
fn cmp_upper<K: Ord>(a: &Bound<K>, b: &Bound<K>) -> Ordering {
    use Bound as B;
    match (a, b) {
        (B::Unbounded, B::Unbounded) => Ordering::Equal,
        (B::Unbounded, _) => Ordering::Greater,
        (_, B::Unbounded) => Ordering::Less,
        (B::Included(x), B::Included(y)) | (B::Excluded(x), B::Excluded(y)) => x.cmp(y),
        (B::Included(x), B::Excluded(y)) => x.cmp(y).then(Ordering::Greater),
        (B::Excluded(x), B::Included(y)) => x.cmp(y).then(Ordering::Less),
    }
}

fn max_lower<K: Ord>(a: Bound<K>, b: Bound<K>) -> Bound<K> {
    if cmp_lower(&a, &b) == Ordering::Greater {
        a
    } else {
        b
    }
}

fn min_upper<K: Ord>(a: Bound<K>, b: Bound<K>) -> Bound<K> {
    if cmp_upper(&a, &b) == Ordering::Less {
        a
    } else {
        b
    }
}

fn max_upper<K: Ord>(a: Bound<K>, b: Bound<K>) -> Bound<K> {
    if cmp_upper(&a, &b) == Ordering::Greater {
        a
    } else {
        b
    }
}

// Whether a range ending at `end` touches or overlaps one starting at `start`.
fn overlaps_or_adjacent<K: Ord>(end: &Bound<K>, start: &Bound<K>) -> bool {
    use Bound as B;
    match (end, start) {
        (B::Unbounded, _) | (_, B::Unbounded) => true,
        (B::Excluded(x), B::Excluded(y)) => x > y,
        (B::Included(x), B::Included(y))
        | (B::Included(x), B::Excluded(y))
        | (B::Excluded(x), B::Included(y)) => x >= y,
    }
}

fn is_empty_range<K: Ord>(start: &Bound<K>, end: &Bound<K>) -> bool {
    use Bound as B;
    match (start, end) {
        (B::Unbounded, _) | (_, B::Unbounded) => false,
        (B::Included(a), B::Included(b)) => a > b,
        (B::Included(a), B::Excluded(b))
        | (B::Excluded(a), B::Included(b))
        | (B::Excluded(a), B::Excluded(b)) => a >= b,
    }
}
