use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Table {0} does not exist or has no readable columns")]
    UnknownTable(String),

    #[error("Postgres tables must be schema-qualified (schema.table), got {0}")]
    MissingSchemaQualifier(String),

    #[error("Catalog query failed for table {table}: {source}")]
    Catalog {
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("UPDATE requires at least one WHERE condition")]
    MissingWhere,

    #[error("DELETE statement is missing a WHERE clause")]
    DeleteWithoutWhere,

    #[error("No values left after filtering against table {0}")]
    EmptyValueSet(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unsupported SQL command: {0}")]
    UnsupportedStatement(String),

    #[error("Page numbers start at 1")]
    InvalidPage,
}

/// Driver-level execution failure. Carries the statement and a rendering of
/// its bindings for diagnostics; the executor never retries.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query failed: {source} (sql: `{sql}`, bindings: {bindings})")]
    Execution {
        sql: String,
        bindings: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("No binding provided for marker :{marker} in `{sql}`")]
    UnboundMarker { marker: String, sql: String },

    #[error("Unsupported SQL command: `{sql}`")]
    UnsupportedStatement { sql: String },

    #[error("DELETE statement is missing a WHERE clause")]
    DeleteWithoutWhere,
}
