//! Live catalog introspection.
//!
//! The filtering step needs to know which columns a table actually has and
//! which of them are identity columns. Both backends expose that through
//! their catalogs, just not the same one: Postgres through
//! `information_schema.columns`, MySQL through `SHOW COLUMNS`.

use async_trait::async_trait;
use sqlx::Row as _;

use crate::errors::SchemaError;
use crate::executor::DbPool;
use crate::ident::TableRef;

/// One column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Auto-generated identity / auto_increment column. These are dropped
    /// from INSERT value sets so the database assigns them.
    pub is_identity: bool,
}

/// The column set of one table, in catalog order.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table: TableRef,
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.name == column)
    }

    pub fn is_identity(&self, column: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.name == column && c.is_identity)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Where schemas come from. The engine talks to this seam so tests can
/// substitute a canned catalog without a running database.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn table_schema(&self, table: &TableRef) -> Result<TableSchema, SchemaError>;
}

/// Catalog-backed schema source. Queries on every call; callers that need
/// caching can layer it on top of this seam.
pub struct LiveSchema {
    pool: DbPool,
}

impl LiveSchema {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn postgres_schema(
        &self,
        pool: &sqlx::PgPool,
        table: &TableRef,
    ) -> Result<TableSchema, SchemaError> {
        let schema = table
            .schema()
            .ok_or_else(|| SchemaError::MissingSchemaQualifier(table.qualified()))?;

        let rows = sqlx::query(
            "SELECT column_name, identity_increment \
             FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 \
             ORDER BY ordinal_position",
        )
        .bind(schema)
        .bind(table.name())
        .fetch_all(pool)
        .await
        .map_err(|source| SchemaError::Catalog {
            table: table.qualified(),
            source,
        })?;

        let columns: Vec<ColumnInfo> = rows
            .iter()
            .map(|row| {
                let name: String = row.get("column_name");
                let identity: Option<String> = row.get("identity_increment");
                ColumnInfo {
                    name,
                    is_identity: identity.is_some(),
                }
            })
            .collect();

        if columns.is_empty() {
            return Err(SchemaError::UnknownTable(table.qualified()));
        }
        Ok(TableSchema {
            table: table.clone(),
            columns,
        })
    }

    async fn mysql_schema(
        &self,
        pool: &sqlx::MySqlPool,
        table: &TableRef,
    ) -> Result<TableSchema, SchemaError> {
        // SHOW COLUMNS cannot take bound parameters; the table name has
        // already passed identifier validation.
        let sql = format!("SHOW COLUMNS FROM {}", table.qualified());
        let rows = sqlx::query(&sql)
            .fetch_all(pool)
            .await
            .map_err(|source| SchemaError::Catalog {
                table: table.qualified(),
                source,
            })?;

        let columns: Vec<ColumnInfo> = rows
            .iter()
            .map(|row| {
                let name: String = row.get("Field");
                let extra: String = row.get("Extra");
                ColumnInfo {
                    name,
                    is_identity: extra.contains("auto_increment"),
                }
            })
            .collect();

        if columns.is_empty() {
            return Err(SchemaError::UnknownTable(table.qualified()));
        }
        Ok(TableSchema {
            table: table.clone(),
            columns,
        })
    }
}

#[async_trait]
impl SchemaSource for LiveSchema {
    async fn table_schema(&self, table: &TableRef) -> Result<TableSchema, SchemaError> {
        match &self.pool {
            DbPool::Postgres(pool) => self.postgres_schema(pool, table).await,
            DbPool::MySql(pool) => self.mysql_schema(pool, table).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> TableSchema {
        TableSchema {
            table: TableRef::parse("public.usuarios").unwrap(),
            columns: vec![
                ColumnInfo {
                    name: "id".to_string(),
                    is_identity: true,
                },
                ColumnInfo {
                    name: "nome".to_string(),
                    is_identity: false,
                },
            ],
        }
    }

    #[test]
    fn test_contains() {
        let s = schema();
        assert!(s.contains("nome"));
        assert!(!s.contains("senha"));
    }

    #[test]
    fn test_identity_lookup() {
        let s = schema();
        assert!(s.is_identity("id"));
        assert!(!s.is_identity("nome"));
        assert!(!s.is_identity("missing"));
    }
}
