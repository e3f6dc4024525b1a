//! Custom error types for the common library
//!
//! This module defines the database error type and the service error
//! taxonomy every core operation reports through.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Classification of a [`ServiceError`], independent of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    AccessDenied,
    NotFound,
    Validation,
    Conflict,
    InvalidOperation,
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    pub const fn status_code(self) -> u16 {
        match self {
            ErrorKind::Unauthenticated => 401,
            ErrorKind::AccessDenied => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::InvalidOperation => 400,
            ErrorKind::Internal => 500,
        }
    }
}

/// Error returned by every identity, category and ledger operation
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing, malformed or expired credential, or an inactive account
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated caller does not own the target resource
    #[error("{0}")]
    AccessDenied(String),

    /// No resource with the given id
    #[error("{0}")]
    NotFound(String),

    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Duplicate username or category
    #[error("{0}")]
    Conflict(String),

    /// Operation not permitted on the resource in its current state
    #[error("{0}")]
    InvalidOperation(String),

    /// Unexpected failure in a collaborator
    #[error("Internal error: {0}")]
    Internal(String),

    /// Storage failure
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::Internal(_) | Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to hand to a caller. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Translate a storage unique-constraint violation into `Conflict`.
    pub fn on_unique_violation(err: SqlxError, message: &str) -> Self {
        match err {
            SqlxError::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::conflict(message)
            }
            other => other.into(),
        }
    }
}

impl From<SqlxError> for ServiceError {
    fn from(err: SqlxError) -> Self {
        Self::Database(DatabaseError::Query(err))
    }
}

/// Type alias for Result with ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;
