//! Validation module
//!
//! Identifier checks for names that reach SQL text at runtime, and the
//! record-level errors produced by derived field validation.

use std::fmt;
use type_mapping::{check_identifier, IdentifierIssue};

/// Validation errors for identifiers and record fields
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name is not a usable PostgreSQL identifier
    InvalidIdentifier { name: String, issue: IdentifierIssue },
    /// Sort property does not name a column of the model
    UnknownProperty { property: String, table: String },
    /// Required text field is empty or blank
    Required { field: String },
    /// Numeric field must not be negative
    Negative { field: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidIdentifier { name, issue } => {
                write!(f, "Invalid identifier '{}': {}", name, issue)
            }
            ValidationError::UnknownProperty { property, table } => {
                write!(f, "Unknown property '{}' for '{}'", property, table)
            }
            ValidationError::Required { field } => write!(f, "Field '{}' is required", field),
            ValidationError::Negative { field } => {
                write!(f, "Field '{}' must not be negative", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated column name that is safe to use in SQL text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName(String);

impl ValidatedFieldName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        check_identifier(name).map_err(|issue| ValidationError::InvalidIdentifier {
            name: name.to_string(),
            issue,
        })?;
        Ok(Self(name.to_string()))
    }

    /// Resolve a sort property against the columns of a table.
    ///
    /// Properties may use the camelCase JSON name of a field; they resolve to
    /// the snake_case column.
    pub fn resolve(
        property: &str,
        table: &str,
        columns: &[&str],
    ) -> Result<Self, ValidationError> {
        let column = to_snake_case(property);
        let field = Self::new(&column)?;
        if !columns.contains(&field.as_str()) {
            return Err(ValidationError::UnknownProperty {
                property: property.to_string(),
                table: table.to_string(),
            });
        }
        Ok(field)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ValidatedFieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `hospitalName` -> `hospital_name`; snake_case input is returned unchanged
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["id", "hospital_name", "icu_beds", "version"];

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("hospitalName"), "hospital_name");
        assert_eq!(to_snake_case("icuBeds"), "icu_beds");
        assert_eq!(to_snake_case("icu_beds"), "icu_beds");
        assert_eq!(to_snake_case("id"), "id");
    }

    #[test]
    fn test_resolve_known_properties() {
        let field = ValidatedFieldName::resolve("hospitalName", "hospitals", COLUMNS).unwrap();
        assert_eq!(field.as_str(), "hospital_name");
        let field = ValidatedFieldName::resolve("version", "hospitals", COLUMNS).unwrap();
        assert_eq!(field.as_str(), "version");
    }

    #[test]
    fn test_resolve_rejects_unknown_property() {
        let err = ValidatedFieldName::resolve("nurses", "hospitals", COLUMNS).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownProperty {
                property: "nurses".to_string(),
                table: "hospitals".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_rejects_injection() {
        let err = ValidatedFieldName::resolve("id; DROP TABLE x", "hospitals", COLUMNS).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidIdentifier {
                issue: IdentifierIssue::InvalidCharacters,
                ..
            }
        ));
    }
}
