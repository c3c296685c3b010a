//! # AvailIt
//!
//! Generic record store for PostgreSQL: derive the table metadata of a record
//! type with `#[model]`, then create, read, update, delete, page and sort its
//! records through `GenericRecordStore`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use availit::prelude::*;
//!
//! #[model]
//! #[table(name = "wards")]
//! pub struct Ward {
//!     #[primary_key]
//!     pub id: Option<i64>,
//!
//!     #[field(required)]
//!     pub name: String,
//!
//!     #[field(non_negative)]
//!     pub beds: i32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let availit = AvailIt::from_config(config).await?;
//!     availit.auto_migrate::<Ward>(false).await?;
//!
//!     let wards = availit.store::<Ward>();
//!     let saved = wards
//!         .save(Ward { id: None, name: "Ward A".to_string(), beds: 5 })
//!         .await?;
//!     assert!(wards.exists_by_id(&saved.id.unwrap()).await?);
//!
//!     let request = PageRequest::new(0, 20, Sort::parse("name,asc"))?;
//!     let page = wards.find_page(&request).await?;
//!     println!("{} of {} wards", page.content.len(), page.total_elements);
//!
//!     Ok(())
//! }
//! ```

// Generated model code refers to this crate as `::availit`
extern crate self as availit;

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod hospital;
pub mod migration;
pub mod prelude;

pub use self::core::AvailIt;
pub use errors::AvailItError;
pub use hospital::{HospitalAvailability, HospitalAvailabilityRepository, Location};

pub use config::{AppConfig, DatabaseConfig, PagingConfig};

// Re-export internal crates used by macros and public API
// These MUST be public for the generated macro code to work correctly
pub use store_object;
pub use table_derive;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use async_trait;
pub use futures;
pub use serde_json;
pub use sqlx;
