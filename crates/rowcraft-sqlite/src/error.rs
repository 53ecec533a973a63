//! Error types for the SQLite backend.

use rowcraft_core::QueryError;
use thiserror::Error;

/// Errors raised while opening or driving a SQLite connection.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The blocking runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl From<SqliteError> for QueryError {
    fn from(err: SqliteError) -> Self {
        Self::connection(err)
    }
}

/// Result type alias for SQLite backend operations.
pub type Result<T> = std::result::Result<T, SqliteError>;
