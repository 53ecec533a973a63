//! Error types for the ORM.

use rowcraft_core::{FieldError, QueryError};
use thiserror::Error;

/// ORM-specific errors.
///
/// Configuration errors name the offending model (its Rust type name) so a
/// misconfigured model is easy to locate.
#[derive(Debug, Clone, Error)]
pub enum OrmError {
    /// A primary key is not mapped to any field of the model.
    #[error("model `{model}` has no field mapped to column `{column}`")]
    MissingColumn {
        /// Model type name.
        model: &'static str,
        /// Unmapped column.
        column: String,
    },

    /// The model declares no primary key.
    #[error("primary keys of `{0}` must not be empty")]
    EmptyPrimaryKeys(&'static str),

    /// Strict mode: no column of the model can be inserted.
    #[error("`{0}` has no insertable column in strict mode")]
    EmptyInsertParams(&'static str),

    /// Strict mode: no column of the model can be updated.
    #[error("`{0}` has no updatable column in strict mode")]
    EmptyUpdateParams(&'static str),

    /// Strict mode: no primary key value is available as update condition.
    #[error("`{0}` has no update condition in strict mode")]
    EmptyUpdateConditions(&'static str),

    /// No primary key value is available to restrict a delete.
    #[error("refusing to delete `{0}` without any condition")]
    UnconditionalDelete(&'static str),

    /// The row id is only known for auto-increment models.
    #[error("row id of `{0}` is available only when auto-increment is enabled")]
    RowIdUnavailable(&'static str),

    /// A value could not be assigned to a field.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Query building or connection error.
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
