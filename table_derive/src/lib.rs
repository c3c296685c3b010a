//! Procedural macros for stored record types
//!
//! `#[model]` adds every derive a record needs; `TableMetadata` generates the
//! table description, the SQL statements and the field accessors the stores use.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod model_macro;
mod parsing;
mod sql_generation;

use model_macro::model_attribute;
use parsing::{parse_field_attributes, parse_table_attributes};
use sql_generation::generate_table_metadata_impl;

/// Derive macro for the `TableMetadata` trait
///
/// Prefer `#[model]`, which adds this derive together with the serde and sqlx
/// derives the stores rely on.
///
/// Supported attributes:
/// - `#[table(name = "...")]` on the struct, required
/// - `#[index(a, b)]` / `#[unique(a, b)]` on the struct for composite indexes
/// - `#[primary_key]` on exactly one `Option<i32 | i64 | Uuid>` field
/// - `#[version]` on at most one `i64` field for optimistic locking
/// - `#[field(required, non_negative, index, unique)]` on data fields
#[proc_macro_derive(
    TableMetadata,
    attributes(table, primary_key, field, version, index, unique)
)]
pub fn derive_table_metadata(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let table_info = match parse_table_attributes(&input.attrs) {
        Ok(attrs) => attrs,
        Err(e) => return e.to_compile_error().into(),
    };

    let field_info = match parse_field_attributes(&input.data, &table_info) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    TokenStream::from(generate_table_metadata_impl(name, &table_info, &field_info))
}

/// Attribute macro that turns a struct into a stored record type
///
/// ```rust,ignore
/// use availit::prelude::*;
///
/// #[model]
/// #[table(name = "wards")]
/// pub struct Ward {
///     #[primary_key]
///     pub id: Option<i64>,
///     #[field(required, index)]
///     pub name: String,
///     #[field(non_negative)]
///     pub beds: i32,
///     #[version]
///     pub version: i64,
/// }
/// ```
#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(attr, item)
}
