//! Error types for the Tablewerk crate
//!
//! Everything the facade can fail with, aggregated from the member crates,
//! plus the HTTP-style status code each failure maps to when the caller is
//! a web handler.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TablewerkError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Schema error: {0}")]
    Schema(#[from] sql_core::SchemaError),

    #[error("Statement error: {0}")]
    Build(#[from] sql_core::BuildError),

    #[error("Query error: {0}")]
    Query(#[from] sql_core::QueryError),

    #[error("Page token error: {0}")]
    Token(#[from] paginate_token::TokenError),

    #[error("Validation error: {0}")]
    Validation(#[from] rule_engine::ValidationError),
}

impl TablewerkError {
    /// Status code a web handler should answer with for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            TablewerkError::Validation(_)
            | TablewerkError::Build(_)
            | TablewerkError::Token(_) => 422,
            // The executor repeats the statement guards; those refusals are
            // caller mistakes like their builder counterparts
            TablewerkError::Query(
                sql_core::QueryError::DeleteWithoutWhere
                | sql_core::QueryError::UnsupportedStatement { .. },
            ) => 422,
            TablewerkError::Schema(sql_core::SchemaError::UnknownTable(_)) => 404,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rule_engine::ValidationError;
    use sql_core::{BuildError, SchemaError};

    #[test]
    fn test_status_codes() {
        let err = TablewerkError::Validation(ValidationError::Failed {
            field: "nome".to_string(),
            message: "The nome field is required.".to_string(),
        });
        assert_eq!(err.status_code(), 422);

        let err = TablewerkError::Build(BuildError::DeleteWithoutWhere);
        assert_eq!(err.status_code(), 422);

        let err = TablewerkError::Query(sql_core::QueryError::DeleteWithoutWhere);
        assert_eq!(err.status_code(), 422);

        let err = TablewerkError::Query(sql_core::QueryError::UnsupportedStatement {
            sql: "TRUNCATE usuarios".to_string(),
        });
        assert_eq!(err.status_code(), 422);

        let err = TablewerkError::Schema(SchemaError::UnknownTable("x".to_string()));
        assert_eq!(err.status_code(), 404);

        let err = TablewerkError::Schema(SchemaError::MissingSchemaQualifier("x".to_string()));
        assert_eq!(err.status_code(), 500);
    }
}
