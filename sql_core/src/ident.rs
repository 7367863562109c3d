//! Identifier validation.
//!
//! Table and column names are spliced into SQL text in places the drivers
//! cannot parameterize (`SHOW COLUMNS FROM ...`, column lists), so every
//! identifier is validated before it gets anywhere near a statement.

use std::fmt;

use crate::errors::BuildError;

/// Identifier length limit shared by both backends (Postgres caps at 63)
const MAX_IDENT_LEN: usize = 63;

/// Statement keywords that are never legal identifiers here
const RESERVED: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "AND", "OR",
    "DROP", "CREATE", "ALTER", "TABLE", "UNION", "LIMIT", "OFFSET",
    "RETURNING",
];

/// A validated, optionally schema-qualified table reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    schema: Option<String>,
    name: String,
}

impl TableRef {
    /// Parse and validate `table` or `schema.table`.
    pub fn parse(raw: &str) -> Result<Self, BuildError> {
        let raw = raw.trim();
        match raw.split_once('.') {
            Some((schema, name)) => {
                validate_segment(schema)?;
                validate_segment(name)?;
                Ok(Self {
                    schema: Some(schema.to_string()),
                    name: name.to_string(),
                })
            }
            None => {
                validate_segment(raw)?;
                Ok(Self {
                    schema: None,
                    name: raw.to_string(),
                })
            }
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The form to splice into SQL text: `schema.table` or `table`.
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

/// Validate a single identifier segment (table, schema, or column name).
pub fn validate_segment(segment: &str) -> Result<(), BuildError> {
    if segment.is_empty() {
        return Err(BuildError::InvalidIdentifier("(empty)".to_string()));
    }
    if segment.len() > MAX_IDENT_LEN {
        return Err(BuildError::InvalidIdentifier(segment.to_string()));
    }

    let mut chars = segment.chars();
    let first = chars.next().unwrap_or('_');
    if !first.is_ascii_alphabetic() && first != '_' {
        return Err(BuildError::InvalidIdentifier(segment.to_string()));
    }
    if !segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(BuildError::InvalidIdentifier(segment.to_string()));
    }
    if RESERVED.contains(&segment.to_ascii_uppercase().as_str()) {
        return Err(BuildError::InvalidIdentifier(segment.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_table() {
        let table = TableRef::parse("usuarios").unwrap();
        assert_eq!(table.name(), "usuarios");
        assert_eq!(table.schema(), None);
        assert_eq!(table.qualified(), "usuarios");
    }

    #[test]
    fn test_qualified_table() {
        let table = TableRef::parse("public.usuarios").unwrap();
        assert_eq!(table.schema(), Some("public"));
        assert_eq!(table.name(), "usuarios");
        assert_eq!(table.qualified(), "public.usuarios");
    }

    #[test]
    fn test_rejects_injection_shapes() {
        for bad in [
            "users; DROP TABLE x",
            "users--",
            "us ers",
            "1users",
            "",
            "users`",
        ] {
            assert!(TableRef::parse(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn test_rejects_keywords() {
        assert!(TableRef::parse("select").is_err());
        assert!(TableRef::parse("public.WHERE").is_err());
    }

    #[test]
    fn test_rejects_overlong() {
        assert!(TableRef::parse(&"a".repeat(64)).is_err());
        assert!(TableRef::parse(&"a".repeat(63)).is_ok());
    }
}
