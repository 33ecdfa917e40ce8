//! Parameterized DML for batches of rows
//!
//! Builders render one statement per row shape. Qualifier columns whose
//! value is NULL in the row become `IS NULL` tests instead of `= ?`, so a
//! batch must be split whenever the NULL pattern of its rows changes.

mod delete;
mod insert;
mod update;

pub use delete::DeleteBatchQueryBuilder;
pub use insert::InsertBatchQueryBuilder;
pub use update::UpdateBatchQueryBuilder;

use crate::dialect::QuotingStrategy;

/// Which qualifier columns of a row hold NULL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSnapshot {
    null_columns: Vec<String>,
}

impl RowSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_null(mut self, column: impl Into<String>) -> Self {
        self.null_columns.push(column.into());
        self
    }

    pub fn is_null(&self, column: &str) -> bool {
        self.null_columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(column))
    }
}

/// Appends ` WHERE a = ? AND b IS NULL ...` for `qualifier`
fn append_qualifier(
    buf: &mut String,
    quoting: &QuotingStrategy,
    qualifier: &[String],
    row: &RowSnapshot,
) {
    for (i, column) in qualifier.iter().enumerate() {
        buf.push_str(if i == 0 { " WHERE " } else { " AND " });
        buf.push_str(&quoting.quoted_name(column));
        if row.is_null(column) {
            buf.push_str(" IS NULL");
        } else {
            buf.push_str(" = ?");
        }
    }
}

/// Qualifier columns that take a bound parameter for `row`
fn bound_qualifier<'q>(qualifier: &'q [String], row: &RowSnapshot) -> Vec<&'q str> {
    qualifier
        .iter()
        .filter(|c| !row.is_null(c))
        .map(String::as_str)
        .collect()
}
