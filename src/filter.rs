//! Parsed filter nodes handed to range construction.
//!
//! Parsing itself happens upstream; this module only fixes the shape of a
//! leaf comparison so [`ColumnValueRange`](crate::range::ColumnValueRange)
//! can be built from it.

use std::{fmt, sync::Arc};

/// Reference identifying a logical column.
///
/// Used as a map key (per-segment dictionaries) and to label decoded
/// columns; it carries no behavior of its own.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    /// Owning table.
    pub table: Arc<str>,
    /// Column id, unique within the table.
    pub id: u32,
    /// Canonical column name.
    pub name: Arc<str>,
}

impl ColumnRef {
    /// Creates a new column reference.
    #[must_use]
    pub fn new<T, N>(table: T, id: u32, name: N) -> Self
    where
        T: Into<Arc<str>>,
        N: Into<Arc<str>>,
    {
        Self {
            table: table.into(),
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// Operator of a single-column filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// Equals (`=`).
    Eq,
    /// Membership in a literal list (`IN`).
    In,
    /// Not equals (`!=`).
    NotEq,
    /// Exclusion from a literal list (`NOT IN`).
    NotIn,
    /// Less than (`<`).
    Lt,
    /// Less than or equal to (`<=`).
    Lte,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal to (`>=`).
    Gte,
    /// `IS NULL`.
    IsNull,
    /// `IS NOT NULL`.
    IsNotNull,
}

impl FilterOperator {
    /// `=` or `IN`.
    #[must_use]
    pub fn is_equality(self) -> bool {
        matches!(self, FilterOperator::Eq | FilterOperator::In)
    }

    /// `!=` or `NOT IN`.
    #[must_use]
    pub fn is_exclusion(self) -> bool {
        matches!(self, FilterOperator::NotEq | FilterOperator::NotIn)
    }

    /// One of the four ordering comparisons.
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            FilterOperator::Lt | FilterOperator::Lte | FilterOperator::Gt | FilterOperator::Gte
        )
    }

    /// `IS NULL` or `IS NOT NULL`.
    #[must_use]
    pub fn is_null_check(self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterOperator::Eq => "=",
            FilterOperator::In => "IN",
            FilterOperator::NotEq => "!=",
            FilterOperator::NotIn => "NOT IN",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::IsNull => "IS NULL",
            FilterOperator::IsNotNull => "IS NOT NULL",
        })
    }
}

/// Leaf filter: `column <op> literals`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompareFilter {
    column: ColumnRef,
    op: FilterOperator,
    values: Vec<Vec<u8>>,
}

impl CompareFilter {
    /// Creates a filter with the given literal operands.
    #[must_use]
    pub fn new<I, V>(column: ColumnRef, op: FilterOperator, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        Self {
            column,
            op,
            values: values.into_iter().map(|v| v.as_ref().to_vec()).collect(),
        }
    }

    /// `column IS NULL`.
    #[must_use]
    pub fn is_null(column: ColumnRef) -> Self {
        Self {
            column,
            op: FilterOperator::IsNull,
            values: Vec::new(),
        }
    }

    /// `column IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(column: ColumnRef) -> Self {
        Self {
            column,
            op: FilterOperator::IsNotNull,
            values: Vec::new(),
        }
    }

    /// Filtered column.
    #[must_use]
    pub fn column(&self) -> &ColumnRef {
        &self.column
    }

    /// Filter operator.
    #[must_use]
    pub fn op(&self) -> FilterOperator {
        self.op
    }

    /// Literal operands in the order they were given.
    #[must_use]
    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }
}

impl fmt::Display for CompareFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.op)?;
        if self.op.is_null_check() {
            return Ok(());
        }
        let mut literals = self.values.iter().map(|v| String::from_utf8_lossy(v));
        if let Some(first) = literals.next() {
            write!(f, " ({first:?}")?;
            for literal in literals {
                write!(f, ", {literal:?}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}
