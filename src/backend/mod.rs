//! Persistence Boundary
//!
//! The core consumes exactly two capabilities from the persistence layer:
//! run a query and get back fully materialized rows of display strings, or
//! run a statement and get back an affected-row count. Everything above this
//! module works against the [`Backend`] trait; the concrete engine lives in
//! [`sqlite`].
//!
//! Result sets are finite, fully materialized, and not restartable. Column
//! values come back as display strings because every consumer (table
//! rendering, trim-and-compare existence checks) wants them that way.

use crate::error::Result;
use crate::query::Statement;

pub mod sqlite;

/// Database access capability consumed by the core
pub trait Backend {
    /// Execute a query, returning rows of display-string column values
    /// together with the result column names
    fn query(&self, stmt: &Statement) -> Result<QueryRows>;

    /// Execute a mutation, returning the affected-row count
    fn execute(&self, stmt: &Statement) -> Result<u64>;

    /// Fetch the first column of the first row, if any
    fn query_one(&self, stmt: &Statement) -> Result<Option<String>> {
        Ok(self
            .query(stmt)?
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next()))
    }
}

/// A materialized result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRows {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Rows of display-string values (NULL renders as empty string)
    pub rows: Vec<Vec<String>>,
}

impl QueryRows {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
