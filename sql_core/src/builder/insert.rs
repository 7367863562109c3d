//! INSERT builder.

use crate::builder::Statement;
use crate::bindings::Bindings;
use crate::dialect::Dialect;
use crate::errors::BuildError;
use crate::filter::filter_values;
use crate::schema::TableSchema;
use crate::ValueMap;

/// Build `INSERT INTO t (c1, c2) VALUES (:c1, :c2)` from a filtered value
/// set. On Postgres a `RETURNING *` clause is appended so the executor can
/// hand back the stored row, identity column included.
pub fn build_insert(
    schema: &TableSchema,
    values: &ValueMap,
    dialect: Dialect,
) -> Result<Statement, BuildError> {
    let kept = filter_values(schema, values);
    if kept.is_empty() {
        return Err(BuildError::EmptyValueSet(schema.table.qualified()));
    }

    let columns: Vec<&str> = kept.iter().map(|(name, _)| name.as_str()).collect();
    let markers: Vec<String> = columns.iter().map(|name| format!(":{}", name)).collect();

    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.table.qualified(),
        columns.join(", "),
        markers.join(", ")
    );
    if dialect.supports_returning() {
        sql.push_str(" RETURNING *");
    }

    let mut bindings = Bindings::new();
    for (name, value) in kept {
        bindings.insert(name, value);
    }

    Ok(Statement::new(sql, bindings))
}
