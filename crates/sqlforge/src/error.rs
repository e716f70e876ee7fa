//! Error types for sqlforge

use crate::stmt::StatementKind;
use crate::value::SqlType;
use thiserror::Error;

/// Result type alias for sqlforge operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Boxed error produced by an execution backend.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for statement construction, rendering and execution
#[derive(Debug, Error)]
pub enum SqlError {
    /// Malformed constructor or mutator input (empty names, negative limits, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operator applied to operands with incompatible declared types
    #[error("Type mismatch: {operator} cannot be applied to {left} and {right}")]
    TypeMismatch {
        operator: &'static str,
        left: SqlType,
        right: SqlType,
    },

    /// INSERT value row length differs from the column list
    #[error("Number of values ({found}) must match number of columns ({expected})")]
    ArityMismatch { expected: usize, found: usize },

    /// Clause mutator or fetch called on a statement kind that forbids it
    #[error("{operation} is not supported on {kind} statements")]
    UnsupportedOperation {
        kind: StatementKind,
        operation: &'static str,
    },

    /// A visitor met an expression variant it does not handle
    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(&'static str),

    /// Statement shape cannot be executed (empty SET, missing RETURNING, ...)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Execution backend failure, kept as-is
    #[error("Backend error: {0}")]
    Backend(#[source] BackendError),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// More rows than the caller asked for
    #[error("Expected {expected} row(s), got {found}")]
    TooManyRows { expected: usize, found: usize },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl SqlError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Wrap a backend failure without reinterpreting it
    pub fn backend(err: impl Into<BackendError>) -> Self {
        Self::Backend(err.into())
    }

    pub(crate) fn unsupported(kind: StatementKind, operation: &'static str) -> Self {
        Self::UnsupportedOperation { kind, operation }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this error came from the execution backend
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend(_))
    }

    /// Borrow the underlying backend error, if any.
    ///
    /// Use this to downcast to the concrete driver error
    /// (e.g. `tokio_postgres::Error`) when you need its SQLSTATE.
    pub fn backend_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Backend(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<tokio_postgres::Error> for SqlError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Backend(Box::new(err))
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SqlError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
