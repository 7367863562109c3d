//! Core Tablewerk functionality
//!
//! The facade that ties the member crates together: it owns the connection
//! pool, introspects schemas, builds and runs statements, validates input
//! maps and issues encrypted page tokens.

use std::time::Duration;

use serde_json::Value;

use config::{AppConfig, DatabaseKind};
use paginate_token::{PageState, PageToken, TokenCodec};
use rule_engine::{RuleOutcome, ValidationMode, Validator};
use sql_core::builder::where_clause::conditions_for_state;
use sql_core::builder::{delete, insert, select, update, Statement};
use sql_core::{
    guard, Bindings, DbPool, Dialect, ExecOutcome, Executor, LiveSchema, Row, SchemaSource,
    TableRef, ValueMap, Where,
};

use crate::debug_log;
use crate::errors::TablewerkError;

/// First page of a paginated select: the rows, the page arithmetic and the
/// opaque token that later page requests present.
#[derive(Debug, Clone)]
pub struct FirstPage {
    pub total_rows: u64,
    pub total_pages: u64,
    pub rows: Vec<Row>,
    pub token: PageToken,
}

/// Main Tablewerk coordinator over one connected database.
pub struct Tablewerk {
    executor: Executor,
    schema: Box<dyn SchemaSource>,
    codec: TokenCodec,
    validator: Validator,
}

impl Tablewerk {
    /// Connect a pool per the configuration and assemble the facade.
    pub async fn connect(config: &AppConfig) -> Result<Self, TablewerkError> {
        config.validate()?;
        let db = &config.database;
        let connection_string = db.connection_string();

        let pool = match db.kind {
            DatabaseKind::Postgres => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(db.max_connections)
                    .min_connections(db.min_connections)
                    .acquire_timeout(Duration::from_secs(db.connection_timeout_seconds))
                    .idle_timeout(Duration::from_secs(db.idle_timeout_seconds))
                    .connect(&connection_string)
                    .await?;
                DbPool::Postgres(pool)
            }
            DatabaseKind::MySql => {
                let pool = sqlx::mysql::MySqlPoolOptions::new()
                    .max_connections(db.max_connections)
                    .min_connections(db.min_connections)
                    .acquire_timeout(Duration::from_secs(db.connection_timeout_seconds))
                    .idle_timeout(Duration::from_secs(db.idle_timeout_seconds))
                    .connect(&connection_string)
                    .await?;
                DbPool::MySql(pool)
            }
        };

        let key = config.token.key_bytes()?;
        Ok(Self::from_pool(pool, &key))
    }

    /// Assemble the facade around an already connected pool.
    pub fn from_pool(pool: DbPool, key: &[u8; 32]) -> Self {
        Self {
            executor: Executor::new(pool.clone()),
            schema: Box::new(LiveSchema::new(pool)),
            codec: TokenCodec::new(key),
            validator: Validator::new(),
        }
    }

    /// Substitute the catalog source, mainly for tests.
    pub fn with_schema_source(mut self, schema: Box<dyn SchemaSource>) -> Self {
        self.schema = schema;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.executor.dialect()
    }

    pub fn pool(&self) -> &DbPool {
        self.executor.pool()
    }

    /// Switch between fail-fast and aggregate validation reporting.
    pub fn validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validator = std::mem::take(&mut self.validator).mode(mode);
        self
    }

    /// Validate a field map against rule chains like `"required|between:6,16"`.
    pub fn validate(
        &self,
        data: &serde_json::Map<String, Value>,
        rules: &[(&str, &str)],
    ) -> Result<RuleOutcome, TablewerkError> {
        Ok(self.validator.validate(data, rules)?)
    }

    /// Insert a filtered value map and return the stored rows.
    pub async fn insert(
        &self,
        table: &str,
        values: &ValueMap,
    ) -> Result<Vec<Row>, TablewerkError> {
        let table = TableRef::parse(table)?;
        let schema = self.schema.table_schema(&table).await?;
        let stmt = insert::build_insert(&schema, values, self.dialect())?;
        debug_log!("insert into {}", table);
        match self.executor.run(&stmt).await? {
            ExecOutcome::Inserted(rows) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }

    /// Update matching rows with a filtered value map; returns the count.
    pub async fn update(
        &self,
        table: &str,
        values: &ValueMap,
        clause: &Where,
    ) -> Result<u64, TablewerkError> {
        let table = TableRef::parse(table)?;
        let schema = self.schema.table_schema(&table).await?;
        let stmt = update::build_update(&schema, values, clause)?;
        debug_log!("update {}", table);
        match self.executor.run(&stmt).await? {
            ExecOutcome::Affected(count) => Ok(count),
            _ => Ok(0),
        }
    }

    /// Delete matching rows; returns the count. Refused without conditions.
    pub async fn delete(&self, table: &str, clause: &Where) -> Result<u64, TablewerkError> {
        let table = TableRef::parse(table)?;
        let stmt = delete::build_delete(&table, clause)?;
        debug_log!("delete from {}", table);
        match self.executor.run(&stmt).await? {
            ExecOutcome::Affected(count) => Ok(count),
            _ => Ok(0),
        }
    }

    /// Select all rows matching the conditions.
    pub async fn select(&self, table: &str, clause: &Where) -> Result<Vec<Row>, TablewerkError> {
        let table = TableRef::parse(table)?;
        let stmt = select::build_select(&table, clause)?;
        match self.executor.run(&stmt).await? {
            ExecOutcome::Rows(rows) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }

    /// Select one column of the first matching row.
    pub async fn select_cell(
        &self,
        table: &str,
        column: &str,
        clause: &Where,
    ) -> Result<Option<Value>, TablewerkError> {
        let table = TableRef::parse(table)?;
        let stmt = select::build_simple_select(&table, &[column], None)?;
        let mut sql = stmt.sql;
        let mut bindings = stmt.bindings;
        sql_core::builder::where_clause::append_where(&mut sql, clause, &mut bindings)?;
        let cell = self
            .executor
            .select_cell(&Statement::new(sql, bindings))
            .await?;
        Ok(cell)
    }

    /// Select a validated column list without conditions.
    pub async fn simple_select(
        &self,
        table: &str,
        columns: &[&str],
        limit: Option<u64>,
    ) -> Result<Vec<Row>, TablewerkError> {
        let table = TableRef::parse(table)?;
        let stmt = select::build_simple_select(&table, columns, limit)?;
        match self.executor.run(&stmt).await? {
            ExecOutcome::Rows(rows) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }

    /// Run the first page of a paginated select and mint the token that
    /// subsequent page requests present.
    pub async fn paginate_first_page(
        &self,
        table: &str,
        clause: &Where,
        page_size: u64,
    ) -> Result<FirstPage, TablewerkError> {
        let table_ref = TableRef::parse(table)?;
        if page_size == 0 {
            return Err(sql_core::BuildError::InvalidPage.into());
        }

        let count_stmt = select::build_count(&table_ref, clause)?;
        let total_rows = match self.executor.select_cell(&count_stmt).await? {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        };
        let total_pages = total_rows.div_ceil(page_size);

        let page_stmt = select::build_select_page(&table_ref, clause, 1, page_size, self.dialect())?;
        let rows = match self.executor.run(&page_stmt).await? {
            ExecOutcome::Rows(rows) => rows,
            _ => Vec::new(),
        };

        let state = PageState::new(
            table_ref.qualified(),
            page_size,
            conditions_for_state(clause)?,
        );
        let token = self.codec.encode(&state)?;
        debug_log!("paginate {}: {} rows over {} pages", table_ref, total_rows, total_pages);

        Ok(FirstPage {
            total_rows,
            total_pages,
            rows,
            token,
        })
    }

    /// Run page `page` (1-based) of a select described by a page token.
    pub async fn paginate_page(
        &self,
        token: &PageToken,
        page: u64,
    ) -> Result<Vec<Row>, TablewerkError> {
        let state = self.codec.decode(token)?;
        let table = TableRef::parse(&state.table)?;
        let clause = Where::from_conditions(&state.conditions);
        let stmt =
            select::build_select_page(&table, &clause, page, state.page_size, self.dialect())?;
        match self.executor.run(&stmt).await? {
            ExecOutcome::Rows(rows) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }

    /// Run caller-written SQL with named-marker bindings. The verb must be
    /// one of the supported statement families, and DELETE text must
    /// already carry a WHERE clause.
    pub async fn run_raw(
        &self,
        sql: &str,
        bindings: Bindings,
    ) -> Result<ExecOutcome, TablewerkError> {
        guard::ensure_supported(sql)?;
        guard::ensure_delete_has_where(sql)?;
        let stmt = Statement::new(sql.to_string(), bindings);
        Ok(self.executor.run(&stmt).await?)
    }

    /// Run caller-written SELECT text and return the rows.
    pub async fn select_raw(
        &self,
        sql: &str,
        bindings: Bindings,
    ) -> Result<Vec<Row>, TablewerkError> {
        match self.run_raw(sql, bindings).await? {
            ExecOutcome::Rows(rows) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }

    /// Run caller-written SELECT text and return the first cell.
    pub async fn select_cell_raw(
        &self,
        sql: &str,
        bindings: Bindings,
    ) -> Result<Option<Value>, TablewerkError> {
        guard::ensure_supported(sql)?;
        let stmt = Statement::new(sql.to_string(), bindings);
        Ok(self.executor.select_cell(&stmt).await?)
    }

    /// Check database connection health.
    pub async fn health_check(&self) -> Result<(), TablewerkError> {
        let stmt = Statement::new("SELECT 1".to_string(), Bindings::new());
        self.executor.run(&stmt).await?;
        Ok(())
    }
}
