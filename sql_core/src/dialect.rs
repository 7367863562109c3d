//! Dialect differences the builders and executor must respect.

use std::fmt;

/// One of the two supported relational backends.
///
/// The dialects differ in catalog introspection, identity-column detection,
/// returning-clause support, placeholder style, and limit/offset syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
}

impl Dialect {
    /// Whether INSERT may carry a `RETURNING *` clause.
    pub fn supports_returning(&self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Driver placeholder for the n-th bound value (1-based).
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", n),
            Dialect::MySql => "?".to_string(),
        }
    }

    /// MySQL's `LIMIT offset,count` grammar requires literals in that
    /// position; Postgres takes bound parameters.
    pub fn inlines_limit(&self) -> bool {
        matches!(self, Dialect::MySql)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::MySql => write!(f, "mysql"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(3), "$3");
        assert_eq!(Dialect::MySql.placeholder(3), "?");
    }

    #[test]
    fn test_returning_support() {
        assert!(Dialect::Postgres.supports_returning());
        assert!(!Dialect::MySql.supports_returning());
    }
}
