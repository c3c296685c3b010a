//! Store error types
//!
//! Every store operation returns `StoreError`. Driver errors are classified on
//! the way out so callers can tell conflicts and outages from plain failures.

use crate::validation::ValidationError;
use thiserror::Error;

/// SQLSTATE codes that mean a concurrent writer won
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No record in '{table}' with id {id}")]
    NotFound { table: String, id: String },

    #[error("Conflicting write on '{table}': {message}")]
    Conflict { table: String, message: String },

    #[error("Duplicate value in '{table}': {message}")]
    Duplicate { table: String, message: String },

    #[error("Backing store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    #[error("Invalid record for '{table}': {source}")]
    Validation {
        table: String,
        #[source]
        source: ValidationError,
    },

    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),

    #[error("Database error on '{table}' during {operation}: {source}")]
    Database {
        table: String,
        operation: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Store configuration error: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Classify a driver error raised by `operation` on `table`
    pub fn database_operation(table: &str, operation: &str, error: sqlx::Error) -> Self {
        if let Some(db_error) = error.as_database_error() {
            let code = db_error.code().map(|c| c.into_owned()).unwrap_or_default();
            let message = format!("{} (SQLSTATE {})", db_error.message(), code);
            match code.as_str() {
                SERIALIZATION_FAILURE | DEADLOCK_DETECTED => {
                    return StoreError::Conflict {
                        table: table.to_string(),
                        message,
                    };
                }
                // Retrying the same write hits the same constraint
                UNIQUE_VIOLATION => {
                    return StoreError::Duplicate {
                        table: table.to_string(),
                        message,
                    };
                }
                _ => {}
            }
        }

        match error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::StoreUnavailable {
                message: format!("{} on '{}' failed: {}", operation, table, error),
                source: Some(error),
            },
            error => StoreError::Database {
                table: table.to_string(),
                operation: operation.to_string(),
                source: error,
            },
        }
    }

    pub fn not_found(table: &str, id: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            table: table.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(table: &str, message: impl Into<String>) -> Self {
        StoreError::Conflict {
            table: table.to_string(),
            message: message.into(),
        }
    }

    pub fn validation(table: &str, source: ValidationError) -> Self {
        StoreError::Validation {
            table: table.to_string(),
            source,
        }
    }

    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Conflict { .. } | StoreError::StoreUnavailable { .. }
        )
    }
}
