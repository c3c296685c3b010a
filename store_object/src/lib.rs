//! Store Object - record store abstraction for AvailIt
//!
//! This crate provides the `GenericRecordStore` contract, the metadata trait
//! derived for record types, paging and sorting types, and two adapters:
//! `PgStore` over PostgreSQL and `MemoryStore` over process memory.

/// Verbose store tracing, compiled in only with the `debug-logging` feature
#[cfg(feature = "debug-logging")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;

pub mod errors;
pub mod generic_store;
pub mod id_type;
pub mod memory_store;
pub mod paging;
pub mod prelude;
pub mod traits;
pub mod validation;

pub use errors::StoreError;
pub use generic_store::PgStore;
pub use id_type::{GeneratedId, HasUniversalId, UniversalId};
pub use memory_store::MemoryStore;
pub use paging::{Direction, Order, Page, PageRequest, Sort};
pub use traits::{GenericRecordStore, RecordStream, TableMetadata};
pub use validation::{ValidatedFieldName, ValidationError};

use sqlx::PgPool;

pub type DbPool = PgPool;
