//! Convenience re-exports for common AvailIt usage
//!
//! ```rust
//! use availit::prelude::*;
//! ```

pub use crate::core::AvailIt;
pub use crate::errors::AvailItError;
pub use crate::hospital::{HospitalAvailability, HospitalAvailabilityRepository, Location};

pub use config::{AppConfig, DatabaseConfig, PagingConfig};

pub use store_object::prelude::*;

// Table derive for model creation
pub use table_derive::{model, TableMetadata};

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;

pub use sqlx::types::Json;
