//! Ordering of field values
//!
//! Compares JSON-encoded field values the way PostgreSQL orders the
//! corresponding column values, so an in-process store sorts records in the
//! same order a database `ORDER BY` would.

use serde_json::Value;
use std::cmp::Ordering;

/// Compare two field values in ascending column order.
///
/// `NULL` (or a missing value) sorts after every other value, matching the
/// PostgreSQL default of `NULLS LAST` for ascending order. Reversing the result
/// for a descending sort yields `NULLS FIRST`, which is also the PostgreSQL default.
pub fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    let left = left.filter(|v| !v.is_null());
    let right = right.filter(|v| !v.is_null());

    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => compare_present(l, r),
    }
}

fn compare_present(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        (Value::Number(l), Value::Number(r)) => compare_numbers(l, r),
        (Value::String(l), Value::String(r)) => compare_strings(l, r),
        // Arrays and objects (JSONB columns) compare by their canonical text
        (l, r) => l.to_string().cmp(&r.to_string()),
    }
}

fn compare_numbers(left: &serde_json::Number, right: &serde_json::Number) -> Ordering {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return l.cmp(&r);
    }
    if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        return l.cmp(&r);
    }
    // serde_json numbers are always finite
    let l = left.as_f64().unwrap_or_default();
    let r = right.as_f64().unwrap_or_default();
    l.partial_cmp(&r).unwrap_or(Ordering::Equal)
}

fn compare_strings(left: &str, right: &str) -> Ordering {
    // Timestamps serialize as RFC 3339 text; order them chronologically
    if let (Ok(l), Ok(r)) = (
        chrono::DateTime::parse_from_rfc3339(left),
        chrono::DateTime::parse_from_rfc3339(right),
    ) {
        return l.cmp(&r);
    }
    left.cmp(right)
}
