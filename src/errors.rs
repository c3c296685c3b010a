//! Error types for the AvailIt coordinator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvailItError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Store(#[from] store_object::StoreError),

    #[error("Store not found: {0}")]
    StoreNotFound(String),

    #[error("Store already registered: {0}")]
    StoreAlreadyRegistered(String),
}
