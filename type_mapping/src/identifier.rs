//! PostgreSQL identifier rules
//!
//! Shared by the model derive (compile-time checks on table and field names)
//! and the store (runtime checks on sort properties), so both accept exactly
//! the same set of names.

/// PostgreSQL identifier length limit
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Columns every table carries in addition to the model's fields
pub const SYSTEM_COLUMNS: &[&str] = &["__created_at__", "__updated_at__"];

const RESERVED_KEYWORDS: &[&str] = &[
    // SQL Standard keywords
    "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "JOIN", "INNER", "LEFT", "RIGHT",
    "FULL", "OUTER", "ON", "AS", "AND", "OR", "NOT", "NULL", "TRUE", "FALSE", "CASE", "WHEN",
    "THEN", "ELSE", "END", "IF", "EXISTS", "IN", "LIKE", "BETWEEN", "ORDER", "BY", "GROUP",
    "HAVING", "LIMIT", "OFFSET", "UNION", "ALL", "DISTINCT", "CREATE", "DROP", "ALTER", "TABLE",
    "INDEX", "VIEW", "DATABASE", "SCHEMA", "PRIMARY", "KEY", "FOREIGN", "REFERENCES", "UNIQUE",
    "CHECK", "DEFAULT", "CONSTRAINT", "COLUMN", "GRANT", "USER", "TO",
    // PostgreSQL specific keywords
    "ANY", "ARRAY", "RETURNING", "CONFLICT", "ANALYSE", "ANALYZE", "ASYMMETRIC", "BOTH", "CAST",
    "COLLATE", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "DO",
    "FETCH", "FOR", "LATERAL", "LEADING", "ONLY", "PLACING", "SOME", "SYMMETRIC",
    "TRAILING", "USING", "VARIADIC", "WINDOW", "WITH",
];

/// Why a name cannot be used as an identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierIssue {
    Empty,
    TooLong(usize),
    InvalidStartCharacter,
    InvalidCharacters,
    ReservedKeyword,
    SystemColumn,
}

impl std::fmt::Display for IdentifierIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierIssue::Empty => write!(f, "name cannot be empty"),
            IdentifierIssue::TooLong(len) => write!(
                f,
                "name is too long: {} characters (max {})",
                len, MAX_IDENTIFIER_LENGTH
            ),
            IdentifierIssue::InvalidStartCharacter => {
                write!(f, "name must start with a letter or underscore")
            }
            IdentifierIssue::InvalidCharacters => write!(
                f,
                "only alphanumeric characters and underscores are allowed"
            ),
            IdentifierIssue::ReservedKeyword => write!(f, "name is a reserved SQL keyword"),
            IdentifierIssue::SystemColumn => write!(f, "name is reserved for a system column"),
        }
    }
}

/// Check a table or column name against PostgreSQL identifier rules
pub fn check_identifier(name: &str) -> Result<(), IdentifierIssue> {
    let first_char = name.chars().next().ok_or(IdentifierIssue::Empty)?;

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierIssue::TooLong(name.len()));
    }
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(IdentifierIssue::InvalidStartCharacter);
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(IdentifierIssue::InvalidCharacters);
    }
    if is_system_column(name) {
        return Err(IdentifierIssue::SystemColumn);
    }
    if is_reserved_keyword(name) {
        return Err(IdentifierIssue::ReservedKeyword);
    }
    Ok(())
}

/// Check if a name is a reserved SQL keyword
pub fn is_reserved_keyword(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

/// Check if a name belongs to a column the store manages itself
pub fn is_system_column(name: &str) -> bool {
    SYSTEM_COLUMNS.contains(&name)
}

/// Quote an already checked identifier for use in SQL text
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
