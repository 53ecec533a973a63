//! Error types for query building and execution.

use std::sync::Arc;

use thiserror::Error;

/// Errors raised while registering clauses, compiling statements, or talking
/// to the connection.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The operator is not part of the grammar's legal set.
    #[error("invalid operator: `{0}`")]
    InvalidOperator(String),

    /// A null value was compared with something other than `=`, `!=` or `<>`.
    #[error("invalid operator `{operator}` for null value on `{column}`")]
    NullComparison {
        /// Column the comparison was registered on.
        column: String,
        /// Offending operator.
        operator: String,
    },

    /// An `in`/`not in` expression received a scalar, or a scalar comparison
    /// received a list.
    #[error("invalid operand for `{column} {operator}`")]
    InvalidOperand {
        /// Column the comparison was registered on.
        column: String,
        /// Operator of the comparison.
        operator: String,
    },

    /// Insert was requested without any column to insert.
    #[error("insert into `{0}` has no parameters")]
    EmptyInsert(String),

    /// Update was requested without any column to set.
    #[error("update of `{0}` has no parameters")]
    EmptyUpdate(String),

    /// Update without any where clause while strict mode is enabled.
    #[error("refusing to update `{0}` without any condition in strict mode")]
    UnconditionalUpdate(String),

    /// Error reported by the underlying connection.
    #[error("connection error: {0}")]
    Connection(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl QueryError {
    /// Wraps an error coming from a connection implementation.
    pub fn connection<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection(Arc::new(err))
    }
}

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
