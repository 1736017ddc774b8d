//! Bound rounding against a dictionary.
//!
//! Comparison literals are frequently absent from a segment's dictionary.
//! Each operator resolves its literal to the nearest code that keeps every
//! matching value and drops every non-matching one.

use crate::dict::Dictionary;

/// Which side of the literal a bound lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Values smaller than the literal (`<`, `<=`).
    Below,
    /// Values greater than the literal (`>`, `>=`).
    Above,
}

/// Code of the nearest value strictly below/above `value`.
///
/// A literal present in the dictionary steps to the adjacent code; an absent
/// one rounds with `floor_code`/`ceiling_code`, which already excludes it.
#[must_use]
pub fn resolve_exclusive(dict: &Dictionary, value: &[u8], direction: Direction) -> Option<u32> {
    match (dict.lookup(value), direction) {
        (Some(code), Direction::Below) => code.checked_sub(1),
        (Some(code), Direction::Above) => code
            .checked_add(1)
            .filter(|next| (*next as usize) < dict.len()),
        (None, Direction::Below) => dict.floor_code(value),
        (None, Direction::Above) => dict.ceiling_code(value),
    }
}

/// Code of the nearest value at or below/above `value`.
#[must_use]
pub fn resolve_inclusive(dict: &Dictionary, value: &[u8], direction: Direction) -> Option<u32> {
    match direction {
        Direction::Below => dict.floor_code(value),
        Direction::Above => dict.ceiling_code(value),
    }
}
