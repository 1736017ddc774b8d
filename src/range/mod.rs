//! Single-column predicate ranges and their dictionary pre-evaluation.
//!
//! A [`ColumnValueRange`] starts out holding the raw literals of a filter.
//! Once the column's dictionary for a segment is known,
//! [`ColumnValueRange::pre_evaluate_with_dict`] rewrites it into dictionary
//! codes: equality sets shrink to the literals the dictionary actually holds,
//! comparison literals round to the nearest existing code, and predicates no
//! row can satisfy collapse into [`RangeState::Unsatisfiable`].

pub mod bound;

use std::{collections::BTreeSet, ops::Bound};

use thiserror::Error;

pub use self::bound::{resolve_exclusive, resolve_inclusive, Direction};
use crate::{
    dict::{DictCode, Dictionary},
    filter::{ColumnRef, CompareFilter, FilterOperator},
    logging::{cubescan_log, LogContext, LogEvent},
    scan::range_set::{KeyRange, RangeSet},
};

/// Errors raised while building a range from a filter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    /// The operator was given the wrong number of literals.
    #[error("Invalid arity for {op}: expected {expected}, got {got}")]
    InvalidArity {
        /// Operator of the filter.
        op: FilterOperator,
        /// Human readable expectation.
        expected: &'static str,
        /// Number of literals supplied.
        got: usize,
    },
}

/// A dictionary code together with the value it stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodedValue {
    code: DictCode,
    value: Option<Vec<u8>>,
}

impl CodedValue {
    // Ids come from the dictionary's own lookups, so `None` only means the
    // query found no code.
    fn id(dict: &Dictionary, id: u32) -> Option<Self> {
        dict.get(id).map(|value| Self {
            code: DictCode::Id(id),
            value: Some(value.to_vec()),
        })
    }

    fn null() -> Self {
        Self {
            code: DictCode::Null,
            value: None,
        }
    }

    /// The code.
    #[must_use]
    pub fn code(&self) -> DictCode {
        self.code
    }

    /// The decoded value; `None` for the null sentinel.
    #[must_use]
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }
}

/// Tightened predicate expressed in dictionary codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodeRange {
    /// Explicit set of matching codes, sorted by code.
    Points(Vec<CodedValue>),
    /// Contiguous codes between two optional inclusive bounds, minus holes.
    Span {
        /// Inclusive lower bound; open when `None`.
        begin: Option<CodedValue>,
        /// Inclusive upper bound; open when `None`.
        end: Option<CodedValue>,
        /// Codes inside the span that do not match, sorted by code.
        excluded: Vec<CodedValue>,
    },
}

/// Lifecycle of a [`ColumnValueRange`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeState {
    /// Raw literal operands, not yet checked against a dictionary.
    Literal(BTreeSet<Vec<u8>>),
    /// Bounds tightened to codes of one dictionary.
    Tightened(CodeRange),
    /// No row can match. Terminal.
    Unsatisfiable,
}

/// Predicate state for one column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnValueRange {
    column: ColumnRef,
    op: FilterOperator,
    state: RangeState,
}

impl ColumnValueRange {
    /// Creates a range from raw literals, validating the operator's arity.
    ///
    /// Equality and exclusion operators take one or more literals, ordering
    /// comparisons exactly one, and null checks none.
    pub fn new<I, V>(column: ColumnRef, op: FilterOperator, values: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        let literals: Vec<Vec<u8>> = values.into_iter().map(|v| v.as_ref().to_vec()).collect();
        let (valid, expected) = if op.is_comparison() {
            (literals.len() == 1, "exactly one literal")
        } else if op.is_null_check() {
            (literals.is_empty(), "no literals")
        } else {
            (!literals.is_empty(), "at least one literal")
        };
        if !valid {
            return Err(RangeError::InvalidArity {
                op,
                expected,
                got: literals.len(),
            });
        }
        Ok(Self {
            column,
            op,
            state: RangeState::Literal(literals.into_iter().collect()),
        })
    }

    /// Creates a range from a parsed filter node.
    pub fn from_filter(filter: &CompareFilter) -> Result<Self, RangeError> {
        Self::new(filter.column().clone(), filter.op(), filter.values())
    }

    /// Column the predicate applies to.
    #[must_use]
    pub fn column(&self) -> &ColumnRef {
        &self.column
    }

    /// Filter operator.
    #[must_use]
    pub fn op(&self) -> FilterOperator {
        self.op
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &RangeState {
        &self.state
    }

    /// Whether the range has been checked against a dictionary.
    #[must_use]
    pub fn is_evaluated(&self) -> bool {
        !matches!(self.state, RangeState::Literal(_))
    }

    /// Whether no row can satisfy the predicate.
    #[must_use]
    pub fn satisfies_none(&self) -> bool {
        matches!(self.state, RangeState::Unsatisfiable)
    }

    /// Rewrites the literals into codes of `dict`, in place.
    ///
    /// Only the first call has an effect: a range that is already tightened
    /// or unsatisfiable is left untouched, so unsatisfiability never reverts.
    pub fn pre_evaluate_with_dict(&mut self, dict: &Dictionary) {
        let tightened = match &self.state {
            RangeState::Literal(literals) => tighten(self.op, literals, dict),
            RangeState::Tightened(_) | RangeState::Unsatisfiable => return,
        };
        self.state = match tightened {
            Some(range) => RangeState::Tightened(range),
            None => {
                cubescan_log!(
                    LogContext::Range,
                    LogEvent::RangeUnsatisfiable,
                    "column={} op={} dictionary_values={}",
                    self.column,
                    self.op,
                    dict.len(),
                );
                RangeState::Unsatisfiable
            }
        };
    }

    /// Lower bound value: the literal before evaluation, the rounded
    /// dictionary value after.
    #[must_use]
    pub fn begin_value(&self) -> Option<&[u8]> {
        match &self.state {
            RangeState::Literal(literals) => match self.op {
                FilterOperator::Gt | FilterOperator::Gte => literals.first(),
                op if op.is_equality() => literals.first(),
                _ => None,
            }
            .map(Vec::as_slice),
            RangeState::Tightened(range) => range.begin().and_then(CodedValue::value),
            RangeState::Unsatisfiable => None,
        }
    }

    /// Upper bound value: the literal before evaluation, the rounded
    /// dictionary value after.
    #[must_use]
    pub fn end_value(&self) -> Option<&[u8]> {
        match &self.state {
            RangeState::Literal(literals) => match self.op {
                FilterOperator::Lt | FilterOperator::Lte => literals.last(),
                op if op.is_equality() => literals.last(),
                _ => None,
            }
            .map(Vec::as_slice),
            RangeState::Tightened(range) => range.end().and_then(CodedValue::value),
            RangeState::Unsatisfiable => None,
        }
    }

    /// Inclusive lower bound code once tightened.
    #[must_use]
    pub fn begin_code(&self) -> Option<DictCode> {
        match &self.state {
            RangeState::Tightened(range) => range.begin().map(CodedValue::code),
            _ => None,
        }
    }

    /// Inclusive upper bound code once tightened.
    #[must_use]
    pub fn end_code(&self) -> Option<DictCode> {
        match &self.state {
            RangeState::Tightened(range) => range.end().map(CodedValue::code),
            _ => None,
        }
    }

    /// Values of an `=`/`IN` predicate: the literals before evaluation, the
    /// surviving dictionary values after.
    #[must_use]
    pub fn equal_values(&self) -> Option<Vec<&[u8]>> {
        if !self.op.is_equality() {
            return None;
        }
        match &self.state {
            RangeState::Literal(literals) => Some(literals.iter().map(Vec::as_slice).collect()),
            RangeState::Tightened(CodeRange::Points(points)) => {
                Some(points.iter().filter_map(CodedValue::value).collect())
            }
            _ => None,
        }
    }

    /// Matching codes of an explicit code set (`=`, `IN`, `IS NULL`).
    #[must_use]
    pub fn equal_codes(&self) -> Option<Vec<DictCode>> {
        match &self.state {
            RangeState::Tightened(CodeRange::Points(points)) => {
                Some(points.iter().map(CodedValue::code).collect())
            }
            _ => None,
        }
    }

    /// Codes removed from the span by `!=`/`NOT IN`.
    #[must_use]
    pub fn excluded_codes(&self) -> Vec<DictCode> {
        match &self.state {
            RangeState::Tightened(CodeRange::Span { excluded, .. }) => {
                excluded.iter().map(CodedValue::code).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Whether a row carrying `code` can satisfy the predicate.
    ///
    /// Ranges that were never evaluated match every code.
    #[must_use]
    pub fn contains_code(&self, code: DictCode) -> bool {
        match &self.state {
            RangeState::Literal(_) => true,
            RangeState::Unsatisfiable => false,
            RangeState::Tightened(CodeRange::Points(points)) => points
                .binary_search_by_key(&code, CodedValue::code)
                .is_ok(),
            RangeState::Tightened(CodeRange::Span {
                begin,
                end,
                excluded,
            }) => {
                !code.is_null()
                    && begin.as_ref().map_or(true, |b| code >= b.code)
                    && end.as_ref().map_or(true, |e| code <= e.code)
                    && excluded
                        .binary_search_by_key(&code, CodedValue::code)
                        .is_err()
            }
        }
    }

    /// Matching codes as a normalized range set, for scan-range construction.
    ///
    /// Open upper bounds stop short of the null sentinel; comparisons never
    /// match null.
    #[must_use]
    pub fn code_ranges(&self) -> RangeSet<DictCode> {
        match &self.state {
            RangeState::Literal(_) => RangeSet::all(),
            RangeState::Unsatisfiable => RangeSet::empty(),
            RangeState::Tightened(CodeRange::Points(points)) => {
                RangeSet::from_ranges(points.iter().map(|p| point(p.code)).collect())
            }
            RangeState::Tightened(CodeRange::Span {
                begin,
                end,
                excluded,
            }) => {
                let start = begin
                    .as_ref()
                    .map_or(Bound::Unbounded, |b| Bound::Included(b.code));
                let end = end
                    .as_ref()
                    .map_or(Bound::Excluded(DictCode::Null), |e| Bound::Included(e.code));
                let span = RangeSet::from_ranges(vec![KeyRange::new(start, end)]);
                if excluded.is_empty() {
                    return span;
                }
                let holes = RangeSet::from_ranges(excluded.iter().map(|h| point(h.code)).collect());
                span.intersect(holes.complement())
            }
        }
    }
}

impl CodeRange {
    fn begin(&self) -> Option<&CodedValue> {
        match self {
            CodeRange::Points(points) => points.first(),
            CodeRange::Span { begin, .. } => begin.as_ref(),
        }
    }

    fn end(&self) -> Option<&CodedValue> {
        match self {
            CodeRange::Points(points) => points.last(),
            CodeRange::Span { end, .. } => end.as_ref(),
        }
    }
}

fn point(code: DictCode) -> KeyRange<DictCode> {
    KeyRange::new(Bound::Included(code), Bound::Included(code))
}

// `None` means no dictionary value can satisfy the operator.
fn tighten(
    op: FilterOperator,
    literals: &BTreeSet<Vec<u8>>,
    dict: &Dictionary,
) -> Option<CodeRange> {
    let literal = || literals.first().map(Vec::as_slice);
    match op {
        FilterOperator::Eq | FilterOperator::In => {
            // Literals iterate in byte order, so the surviving codes are sorted.
            let points: Vec<CodedValue> = literals
                .iter()
                .filter_map(|v| dict.lookup(v))
                .filter_map(|id| CodedValue::id(dict, id))
                .collect();
            (!points.is_empty()).then_some(CodeRange::Points(points))
        }
        FilterOperator::NotEq | FilterOperator::NotIn => tighten_exclusion(literals, dict),
        FilterOperator::Lt => upper(
            dict,
            literal().and_then(|x| resolve_exclusive(dict, x, Direction::Below)),
        ),
        FilterOperator::Lte => upper(
            dict,
            literal().and_then(|x| resolve_inclusive(dict, x, Direction::Below)),
        ),
        FilterOperator::Gt => lower(
            dict,
            literal().and_then(|x| resolve_exclusive(dict, x, Direction::Above)),
        ),
        FilterOperator::Gte => lower(
            dict,
            literal().and_then(|x| resolve_inclusive(dict, x, Direction::Above)),
        ),
        FilterOperator::IsNull => Some(CodeRange::Points(vec![CodedValue::null()])),
        FilterOperator::IsNotNull => {
            let begin = dict.min_code().and_then(|id| CodedValue::id(dict, id))?;
            let end = dict.max_code().and_then(|id| CodedValue::id(dict, id))?;
            Some(CodeRange::Span {
                begin: Some(begin),
                end: Some(end),
                excluded: Vec::new(),
            })
        }
    }
}

fn upper(dict: &Dictionary, end: Option<u32>) -> Option<CodeRange> {
    let end = CodedValue::id(dict, end?)?;
    Some(CodeRange::Span {
        begin: None,
        end: Some(end),
        excluded: Vec::new(),
    })
}

fn lower(dict: &Dictionary, begin: Option<u32>) -> Option<CodeRange> {
    let begin = CodedValue::id(dict, begin?)?;
    Some(CodeRange::Span {
        begin: Some(begin),
        end: None,
        excluded: Vec::new(),
    })
}

// Literals the dictionary does not hold exclude nothing and are dropped. The
// span shrinks to the outermost codes that are not excluded.
fn tighten_exclusion(literals: &BTreeSet<Vec<u8>>, dict: &Dictionary) -> Option<CodeRange> {
    let excluded: BTreeSet<u32> = literals.iter().filter_map(|v| dict.lookup(v)).collect();
    let len = u32::try_from(dict.len()).ok()?;
    let begin = (0..len).find(|code| !excluded.contains(code))?;
    let end = (0..len).rev().find(|code| !excluded.contains(code))?;
    let holes = excluded
        .range(begin..=end)
        .filter_map(|code| CodedValue::id(dict, *code))
        .collect();
    Some(CodeRange::Span {
        begin: CodedValue::id(dict, begin),
        end: CodedValue::id(dict, end),
        excluded: holes,
    })
}
