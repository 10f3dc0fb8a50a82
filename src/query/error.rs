//! Query error types
//!
//! Defines the error conditions a filter, search or projection call can
//! raise. A call that matches nothing is not an error: it returns an empty
//! dataset.

use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A predicate argument had the wrong semantic type
    #[error("Invalid filter argument: {0}")]
    InvalidFilterArgument(String),

    /// Referenced field does not exist on merged records
    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
