//! Connection contract.
//!
//! The query builder never opens database handles itself. It compiles
//! statements to text and hands them to a [`Connection`], which executes
//! them and returns raw [`Row`]s for the materializer.

use crate::error::Result;
use crate::grammar::Grammar;
use crate::materialize::materialize_all;
use crate::record::Record;
use crate::value::SqlValue;

/// One result row: column names and values in result order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row from parallel column and value lists.
    ///
    /// Extra entries of the longer list are dropped.
    #[must_use]
    pub fn new(mut columns: Vec<String>, mut values: Vec<SqlValue>) -> Self {
        let len = columns.len().min(values.len());
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, SqlValue)>,
        K: Into<String>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(column, value)| (column.into(), value))
            .unzip();
        Self { columns, values }
    }

    /// Value of the first column named `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|i| &self.values[i])
    }

    /// Column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// A database session able to run compiled statements.
///
/// Implementations are blocking: every call runs to completion on the
/// caller's thread.
pub trait Connection {
    /// Grammar used to compile statements for this connection.
    fn grammar(&self) -> &dyn Grammar;

    /// Runs a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Connection`](crate::QueryError::Connection) on
    /// failure.
    fn execute(&self, sql: &str) -> Result<()>;

    /// Runs a read statement and returns its rows in result order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Connection`](crate::QueryError::Connection) on
    /// failure.
    fn fetch(&self, sql: &str) -> Result<Vec<Row>>;

    /// Id generated by the most recent insert on this session.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Connection`](crate::QueryError::Connection) on
    /// failure.
    fn last_insert_rowid(&self) -> Result<i64>;
}

impl dyn Connection + '_ {
    /// Runs a read statement and materializes every row as `R`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Connection::fetch`].
    pub fn query<R: Record>(&self, sql: &str) -> Result<Vec<R>> {
        let rows = self.fetch(sql)?;
        Ok(materialize_all(&rows))
    }
}
