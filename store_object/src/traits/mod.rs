//! Traits for record stores
//!
//! `TableMetadata` is derived per record type; `GenericRecordStore` is the
//! storage contract every adapter implements.

pub mod core;
pub mod table_metadata;

pub use self::core::{GenericRecordStore, RecordStream};
pub use table_metadata::TableMetadata;
