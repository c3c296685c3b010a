//! SQL type conversion utilities
//!
//! This module handles conversion between Rust types
//! and their SQL equivalents.

/// Map Rust type names to PostgreSQL types for DDL generation
pub fn rust_type_to_pg_type(rust_type: &str) -> &'static str {
    // Normalize type string by removing all whitespace for consistent matching
    let normalized = rust_type.replace(' ', "");

    // Option<T> maps to the same column type as T, nullability is decided separately
    if let Some(inner) = option_inner_type(&normalized) {
        return rust_type_to_pg_type(inner);
    }

    // Typed JSON wrappers (sqlx::types::Json<T>, Json<T>)
    if normalized.starts_with("sqlx::types::Json<") || normalized.starts_with("Json<") {
        return "JSONB";
    }

    match normalized.as_str() {
        "Uuid" | "uuid::Uuid" => "UUID",
        "String" => "VARCHAR",
        "i16" => "SMALLINT",
        "i32" => "INTEGER",
        "i64" => "BIGINT",
        "f32" => "REAL",
        "f64" => "DOUBLE PRECISION",
        "bool" => "BOOLEAN",
        "chrono::DateTime<chrono::Utc>" | "DateTime<Utc>" => "TIMESTAMP WITH TIME ZONE",
        // sqlx decodes NaiveDateTime from TIMESTAMP only
        "chrono::NaiveDateTime" | "NaiveDateTime" => "TIMESTAMP",
        "chrono::NaiveDate" | "NaiveDate" => "DATE",
        "serde_json::Value" | "Value" => "JSONB",
        "Vec<String>" => "TEXT[]",
        _ => "VARCHAR", // default fallback
    }
}

/// Why a field type cannot be stored, or `None` when it can.
///
/// The PostgreSQL driver has no encoding for unsigned integers, and decimals
/// need a driver feature this crate does not enable.
pub fn unsupported_column_type(rust_type: &str) -> Option<&'static str> {
    let normalized = rust_type.replace(' ', "");
    let inner = option_inner_type(&normalized).unwrap_or(&normalized);
    match inner {
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => {
            Some("unsigned integers have no PostgreSQL encoding, use i16, i32 or i64")
        }
        "i8" | "i128" | "isize" => Some("use i16, i32 or i64 for integer columns"),
        "Decimal" | "rust_decimal::Decimal" => Some("decimal columns are not supported, use f64"),
        _ => None,
    }
}

/// Column type for a store-assigned primary key of the given Rust type.
///
/// Returns the PostgreSQL type and the column default, or `None` when the store
/// has no way to generate keys of that type.
pub fn identity_column_type(rust_type: &str) -> Option<(&'static str, &'static str)> {
    match rust_type.replace(' ', "").as_str() {
        "i32" => Some(("SERIAL", "")),
        "i64" => Some(("BIGSERIAL", "")),
        "Uuid" | "uuid::Uuid" => Some(("UUID", "DEFAULT gen_random_uuid()")),
        _ => None,
    }
}

/// Check if a Rust type is Optional (nullable in SQL)
pub fn is_optional_type(rust_type: &str) -> bool {
    rust_type.trim().starts_with("Option")
}

/// Inner type of an `Option<...>` type string, if it is one
pub fn option_inner_type(rust_type: &str) -> Option<&str> {
    let trimmed = rust_type.trim();
    let inner = trimmed
        .strip_prefix("std::option::Option<")
        .or_else(|| trimmed.strip_prefix("Option<"))?;
    inner.strip_suffix('>').map(str::trim)
}
