//! Unified type mapping between Rust types and PostgreSQL
//! This crate provides the mapping logic shared by the model derive (DDL generation)
//! and the stores (identifier rules, PostgreSQL-compatible ordering of field values).

pub mod identifier;
pub mod ordering;
pub mod sql;

pub use identifier::{check_identifier, quote_identifier, IdentifierIssue};
pub use ordering::compare_values;
pub use sql::{
    identity_column_type, is_optional_type, option_inner_type, rust_type_to_pg_type,
    unsupported_column_type,
};
