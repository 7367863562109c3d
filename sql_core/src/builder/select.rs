//! SELECT builders: filtered selects, count queries and page windows.

use crate::builder::where_clause::{append_where, Where};
use crate::builder::Statement;
use crate::bindings::Bindings;
use crate::dialect::Dialect;
use crate::errors::BuildError;
use crate::ident::{validate_segment, TableRef};

/// Build `SELECT * FROM t [WHERE ...]`.
pub fn build_select(table: &TableRef, clause: &Where) -> Result<Statement, BuildError> {
    let mut sql = format!("SELECT * FROM {}", table.qualified());
    let mut bindings = Bindings::new();
    append_where(&mut sql, clause, &mut bindings)?;
    Ok(Statement::new(sql, bindings))
}

/// Build `SELECT COUNT(*) AS total FROM t [WHERE ...]` for page math.
pub fn build_count(table: &TableRef, clause: &Where) -> Result<Statement, BuildError> {
    let mut sql = format!("SELECT COUNT(*) AS total FROM {}", table.qualified());
    let mut bindings = Bindings::new();
    append_where(&mut sql, clause, &mut bindings)?;
    Ok(Statement::new(sql, bindings))
}

/// Build one page window. Pages are 1-based; the offset is computed here so
/// tokens only ever carry the page size, never raw offsets.
///
/// MySQL's `LIMIT offset,count` position does not accept bound parameters,
/// so the computed numbers are inlined there; Postgres binds them.
pub fn build_select_page(
    table: &TableRef,
    clause: &Where,
    page: u64,
    page_size: u64,
    dialect: Dialect,
) -> Result<Statement, BuildError> {
    if page == 0 || page_size == 0 {
        return Err(BuildError::InvalidPage);
    }
    let offset = (page - 1) * page_size;

    let mut sql = format!("SELECT * FROM {}", table.qualified());
    let mut bindings = Bindings::new();
    append_where(&mut sql, clause, &mut bindings)?;

    if dialect.inlines_limit() {
        sql.push_str(&format!(" LIMIT {},{}", offset, page_size));
    } else {
        sql.push_str(" LIMIT :limit OFFSET :start");
        bindings.insert("limit", serde_json::Value::from(page_size));
        bindings.insert("start", serde_json::Value::from(offset));
    }

    Ok(Statement::new(sql, bindings))
}

/// Build `SELECT c1, c2 FROM t [LIMIT n]` with every column validated.
/// An empty column list means `*`.
pub fn build_simple_select(
    table: &TableRef,
    columns: &[&str],
    limit: Option<u64>,
) -> Result<Statement, BuildError> {
    let column_list = if columns.is_empty() {
        "*".to_string()
    } else {
        for column in columns {
            validate_segment(column)?;
        }
        columns.join(", ")
    };

    let mut sql = format!("SELECT {} FROM {}", column_list, table.qualified());
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {}", n));
    }

    Ok(Statement::new(sql, Bindings::new()))
}
