//! Convenience re-exports for common store-object usage

pub use crate::traits::{GenericRecordStore, RecordStream, TableMetadata};

pub use crate::errors::StoreError;

pub use crate::generic_store::PgStore;
pub use crate::memory_store::MemoryStore;

pub use crate::paging::{Direction, Page, PageRequest, Sort};

pub use crate::validation::ValidationError;

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use futures::StreamExt;
pub use serde::{Deserialize, Serialize};
pub use sqlx::{FromRow, PgPool};
pub use uuid::Uuid;
