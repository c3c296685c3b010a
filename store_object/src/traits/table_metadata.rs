//! Trait definitions
//!
//! `TableMetadata` describes how one record type maps onto its table. It is
//! implemented by `#[derive(TableMetadata)]`, normally through `#[model]`.

use crate::id_type::{GeneratedId, HasUniversalId};
use crate::validation::ValidationError;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::postgres::{PgArguments, PgHasArrayType, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};
use std::fmt::Debug;
use std::hash::Hash;

/// Metadata about a record type's table and the SQL used to store it
///
/// ```rust,ignore
/// use availit::prelude::*;
///
/// #[model]
/// #[table(name = "wards")]
/// pub struct Ward {
///     #[primary_key]
///     pub id: Option<i64>,
///
///     #[field(required)]
///     pub name: String,
///
///     #[field(non_negative)]
///     pub beds: i32,
/// }
/// ```
pub trait TableMetadata:
    Clone
    + Send
    + Sync
    + Debug
    + Unpin
    + Serialize
    + DeserializeOwned
    + for<'r> FromRow<'r, PgRow>
    + 'static
{
    /// The type used for the primary key
    type Id: Clone
        + Send
        + Sync
        + Debug
        + Eq
        + Ord
        + Hash
        + Unpin
        + 'static
        + HasUniversalId
        + GeneratedId
        + for<'q> sqlx::Encode<'q, Postgres>
        + for<'r> sqlx::Decode<'r, Postgres>
        + sqlx::Type<Postgres>
        + PgHasArrayType;

    /// The table name in the database
    fn table_name() -> &'static str;

    /// The primary key column
    fn primary_key_field() -> &'static str;

    /// Every persisted column of the model: key, data columns, version
    fn columns() -> &'static [&'static str];

    /// Column holding the optimistic version, if the model has one
    fn version_field() -> Option<&'static str> {
        None
    }

    /// INSERT of every data column, returning the stored row
    fn insert_sql() -> &'static str;

    /// UPDATE by key (and version when versioned), returning the stored row
    fn update_sql() -> &'static str;

    fn get_by_id_sql() -> &'static str;

    /// SELECT of all rows whose key is in an array parameter
    fn find_all_by_id_sql() -> &'static str;

    fn exists_by_id_sql() -> &'static str;

    fn delete_by_id_sql() -> &'static str;

    /// DELETE by key, and by version when the model is versioned
    fn delete_entity_sql() -> &'static str;

    /// DELETE of all rows whose key is in an array parameter, returning the keys
    fn delete_all_by_id_sql() -> &'static str;

    fn delete_all_sql() -> &'static str;

    /// COUNT of all rows, aliased `total`
    fn count_all_sql() -> &'static str;

    /// SELECT without any clause, for ordered and paged queries
    fn select_base_sql() -> &'static str;

    /// Generate CREATE TABLE SQL statement
    fn create_table_sql() -> String;

    /// Generate DROP TABLE SQL statement
    fn drop_table_sql() -> String {
        format!(
            "DROP TABLE IF EXISTS {}",
            type_mapping::quote_identifier(Self::table_name())
        )
    }

    /// Generate CREATE INDEX SQL statements
    fn create_indexes_sql() -> Vec<String> {
        vec![]
    }

    /// The identifier, `None` until the store assigns one
    fn id(&self) -> Option<Self::Id>;

    fn set_id(&mut self, id: Self::Id);

    fn version(&self) -> Option<i64> {
        None
    }

    fn set_version(&mut self, _version: i64) {}

    /// JSON form of a column's value, used to order records outside the database
    fn field_value(&self, column: &str) -> Option<serde_json::Value>;

    /// Check the field rules declared with `#[field(...)]`
    fn validate(&self) -> Result<(), ValidationError>;

    /// Bind the data columns for `insert_sql`
    fn bind_insert<'q>(
        &'q self,
        query: QueryAs<'q, Postgres, Self, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self, PgArguments>;

    /// Bind the data columns, key and version for `update_sql`
    fn bind_update<'q>(
        &'q self,
        query: QueryAs<'q, Postgres, Self, PgArguments>,
    ) -> QueryAs<'q, Postgres, Self, PgArguments>;
}
