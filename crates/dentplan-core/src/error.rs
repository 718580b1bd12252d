//! Error types for the treatment-plan engine.
//!
//! Every business-rule failure maps onto one of four outcome classes
//! ([`ErrorKind`]): not found, validation, conflict and access denied. None of
//! them are transient; callers never retry them.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Stable codes carried by [`PlannerError::Validation`].
pub mod codes {
    pub const EMPTY_PLAN: &str = "EMPTY_PLAN";
    pub const DISCOUNT_EXCEEDS_TOTAL: &str = "DISCOUNT_EXCEEDS_TOTAL";
    pub const NEGATIVE_AMOUNT: &str = "NEGATIVE_AMOUNT";
    pub const REJECTION_NOTE_REQUIRED: &str = "REJECTION_NOTE_REQUIRED";
    pub const ITEM_COUNT_MISMATCH: &str = "ITEM_COUNT_MISMATCH";
    pub const DUPLICATE_ITEM: &str = "DUPLICATE_ITEM";
    pub const ITEM_NOT_IN_PHASE: &str = "ITEM_NOT_IN_PHASE";
    pub const SPECIALIZATION_MISMATCH: &str = "SPECIALIZATION_MISMATCH";
    pub const DOCTOR_INACTIVE: &str = "DOCTOR_INACTIVE";
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    pub const INVALID_QUANTITY: &str = "INVALID_QUANTITY";
    pub const INVALID_DATE: &str = "INVALID_DATE";
}

/// Comprehensive error type for all planner operations.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A plan, phase, item, actor or catalog entry does not exist
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
    /// Business-rule validation failure with a stable code
    #[error("{code}: {message}")]
    Validation { code: &'static str, message: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// The aggregate is in a state that does not allow the request
    #[error("Conflict: {message}")]
    Conflict { message: String },
    /// The acting user may not perform the request
    #[error("Access denied: {message}")]
    AccessDenied { message: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Outcome class of an error, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    AccessDenied,
    Internal,
}

impl ErrorKind {
    /// HTTP-equivalent status code for the outcome class.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Validation => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::AccessDenied => 403,
            ErrorKind::Internal => 500,
        }
    }
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> PlannerError {
        PlannerError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> PlannerError {
        PlannerError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl PlannerError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a new database error with additional context.
    pub fn database_error(message: &str, source: rusqlite::Error) -> Self {
        Self::database(message).with_source(source)
    }

    pub fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Classifies the error into its outcome class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlannerError::NotFound { .. } => ErrorKind::NotFound,
            PlannerError::Validation { .. } | PlannerError::InvalidInput { .. } => {
                ErrorKind::Validation
            }
            PlannerError::Conflict { .. } => ErrorKind::Conflict,
            PlannerError::AccessDenied { .. } => ErrorKind::AccessDenied,
            PlannerError::Database { .. }
            | PlannerError::FileSystem { .. }
            | PlannerError::XdgDirectory(_)
            | PlannerError::Serialization { .. }
            | PlannerError::Configuration { .. } => ErrorKind::Internal,
        }
    }

    /// Validation code, if this is a coded validation failure.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            PlannerError::Validation { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| PlannerError::database(message).with_source(e))
    }
}

/// Extension for turning a missing row into [`PlannerError::NotFound`].
pub trait OptionExt<T> {
    fn or_not_found(self, entity: &'static str, key: impl fmt::Display) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, entity: &'static str, key: impl fmt::Display) -> Result<T> {
        self.ok_or_else(|| PlannerError::not_found(entity, key))
    }
}

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;
