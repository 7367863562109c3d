//! Statement execution with result classification.
//!
//! The executor owns the last unsafe-looking step: rewriting named markers
//! into driver placeholders, binding the values in order, and choosing how
//! to run the statement based on its verb. Inserts get special handling so
//! both backends hand back the stored row.

use serde_json::Value;
use sqlx::mysql::MySqlArguments;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Row as _;

use crate::bindings::expand_markers;
use crate::builder::guard::{self, StatementKind};
use crate::builder::Statement;
use crate::dialect::Dialect;
use crate::errors::QueryError;
use crate::row::{mysql_row_to_map, pg_row_to_map, Row};

/// One connected pool, either backend.
#[derive(Clone)]
pub enum DbPool {
    Postgres(sqlx::PgPool),
    MySql(sqlx::MySqlPool),
}

impl DbPool {
    pub fn dialect(&self) -> Dialect {
        match self {
            DbPool::Postgres(_) => Dialect::Postgres,
            DbPool::MySql(_) => Dialect::MySql,
        }
    }
}

/// What a statement produced, classified by verb.
#[derive(Debug, Clone)]
pub enum ExecOutcome {
    /// Rows stored by an INSERT. Empty when the backend could not report
    /// them (MySQL table without a primary key).
    Inserted(Vec<Row>),
    /// Row count touched by UPDATE or DELETE.
    Affected(u64),
    /// Result set of a SELECT or DESCRIBE.
    Rows(Vec<Row>),
    /// DDL ran to completion.
    Done,
}

fn bind_pg<'q>(
    query: Query<'q, sqlx::Postgres, PgArguments>,
    value: &Value,
) -> Query<'q, sqlx::Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.clone()),
    }
}

fn bind_mysql<'q>(
    query: Query<'q, sqlx::MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, sqlx::MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(Option::<String>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.clone()),
    }
}

pub struct Executor {
    pool: DbPool,
}

impl Executor {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.pool.dialect()
    }

    /// Run one built statement and classify the result by verb.
    pub async fn run(&self, statement: &Statement) -> Result<ExecOutcome, QueryError> {
        let kind =
            guard::classify(&statement.sql).ok_or_else(|| QueryError::UnsupportedStatement {
                sql: statement.sql.clone(),
            })?;
        if kind == StatementKind::Delete
            && guard::ensure_delete_has_where(&statement.sql).is_err()
        {
            return Err(QueryError::DeleteWithoutWhere);
        }

        let (sql, values) = expand_markers(&statement.sql, &statement.bindings, self.dialect())?;
        tracing::debug!(sql = %sql, bindings = %statement.bindings.describe(), "executing");

        match &self.pool {
            DbPool::Postgres(pool) => self.run_postgres(pool, kind, &sql, &values, statement).await,
            DbPool::MySql(pool) => self.run_mysql(pool, kind, &sql, &values, statement).await,
        }
    }

    /// Run a statement expected to yield a single cell; `None` when the
    /// result set is empty.
    pub async fn select_cell(&self, statement: &Statement) -> Result<Option<Value>, QueryError> {
        match self.run(statement).await? {
            ExecOutcome::Rows(rows) | ExecOutcome::Inserted(rows) => Ok(rows
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next().map(|(_, value)| value))),
            _ => Ok(None),
        }
    }

    async fn run_postgres(
        &self,
        pool: &sqlx::PgPool,
        kind: StatementKind,
        sql: &str,
        values: &[Value],
        statement: &Statement,
    ) -> Result<ExecOutcome, QueryError> {
        let mut query = sqlx::query(sql);
        for value in values {
            query = bind_pg(query, value);
        }

        let fail = |source: sqlx::Error| QueryError::Execution {
            sql: sql.to_string(),
            bindings: statement.bindings.describe(),
            source,
        };

        match kind {
            StatementKind::Insert => {
                // RETURNING * makes the insert a row-producing statement
                let rows = query.fetch_all(pool).await.map_err(fail)?;
                Ok(ExecOutcome::Inserted(rows.iter().map(pg_row_to_map).collect()))
            }
            StatementKind::Update | StatementKind::Delete => {
                let result = query.execute(pool).await.map_err(fail)?;
                Ok(ExecOutcome::Affected(result.rows_affected()))
            }
            StatementKind::Select | StatementKind::Describe => {
                let rows = query.fetch_all(pool).await.map_err(fail)?;
                Ok(ExecOutcome::Rows(rows.iter().map(pg_row_to_map).collect()))
            }
            StatementKind::Create | StatementKind::Alter => {
                query.execute(pool).await.map_err(fail)?;
                Ok(ExecOutcome::Done)
            }
        }
    }

    async fn run_mysql(
        &self,
        pool: &sqlx::MySqlPool,
        kind: StatementKind,
        sql: &str,
        values: &[Value],
        statement: &Statement,
    ) -> Result<ExecOutcome, QueryError> {
        let mut query = sqlx::query(sql);
        for value in values {
            query = bind_mysql(query, value);
        }

        let fail = |source: sqlx::Error| QueryError::Execution {
            sql: sql.to_string(),
            bindings: statement.bindings.describe(),
            source,
        };

        match kind {
            StatementKind::Insert => {
                let result = query.execute(pool).await.map_err(fail)?;
                let id = result.last_insert_id();
                if id == 0 {
                    return Ok(ExecOutcome::Inserted(Vec::new()));
                }
                let rows = self.reselect_inserted(pool, &statement.sql, id).await?;
                Ok(ExecOutcome::Inserted(rows))
            }
            StatementKind::Update | StatementKind::Delete => {
                let result = query.execute(pool).await.map_err(fail)?;
                Ok(ExecOutcome::Affected(result.rows_affected()))
            }
            StatementKind::Select | StatementKind::Describe => {
                let rows = query.fetch_all(pool).await.map_err(fail)?;
                Ok(ExecOutcome::Rows(rows.iter().map(mysql_row_to_map).collect()))
            }
            StatementKind::Create | StatementKind::Alter => {
                query.execute(pool).await.map_err(fail)?;
                Ok(ExecOutcome::Done)
            }
        }
    }

    /// MySQL has no RETURNING. Re-select the stored row through the
    /// table's primary key and the reported insert id.
    async fn reselect_inserted(
        &self,
        pool: &sqlx::MySqlPool,
        insert_sql: &str,
        id: u64,
    ) -> Result<Vec<Row>, QueryError> {
        let Some(table) = guard::table_from_query(insert_sql) else {
            return Ok(Vec::new());
        };

        let keys_sql = format!("SHOW KEYS FROM {} WHERE Key_name = 'PRIMARY'", table);
        let key_row = sqlx::query(&keys_sql)
            .fetch_optional(pool)
            .await
            .map_err(|source| QueryError::Execution {
                sql: keys_sql.clone(),
                bindings: "[]".to_string(),
                source,
            })?;
        let Some(key_row) = key_row else {
            return Ok(Vec::new());
        };
        let pk: String = key_row.get("Column_name");

        let select_sql = format!("SELECT * FROM {} WHERE {} = ?", table, pk);
        let rows = sqlx::query(&select_sql)
            .bind(id)
            .fetch_all(pool)
            .await
            .map_err(|source| QueryError::Execution {
                sql: select_sql.clone(),
                bindings: format!("[?={}]", id),
                source,
            })?;
        Ok(rows.iter().map(|row| mysql_row_to_map(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_pool_variant_names() {
        // Pool construction needs a server; the dialect mapping is pure.
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
        assert_eq!(Dialect::MySql.to_string(), "mysql");
    }
}
