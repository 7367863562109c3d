//! UPDATE builder.

use crate::builder::where_clause::{append_where, Where};
use crate::builder::Statement;
use crate::bindings::Bindings;
use crate::errors::BuildError;
use crate::filter::filter_values;
use crate::schema::TableSchema;
use crate::ValueMap;

/// Build `UPDATE t SET c1 = :c1, ... WHERE ...`. Updates without a WHERE
/// are refused; a full-table update is never what the caller meant.
pub fn build_update(
    schema: &TableSchema,
    values: &ValueMap,
    clause: &Where,
) -> Result<Statement, BuildError> {
    if clause.is_none() {
        return Err(BuildError::MissingWhere);
    }

    let kept = filter_values(schema, values);
    if kept.is_empty() {
        return Err(BuildError::EmptyValueSet(schema.table.qualified()));
    }

    let assignments: Vec<String> = kept
        .iter()
        .map(|(name, _)| format!("{} = :{}", name, name))
        .collect();
    let mut sql = format!(
        "UPDATE {} SET {}",
        schema.table.qualified(),
        assignments.join(", ")
    );

    let mut bindings = Bindings::new();
    for (name, value) in kept {
        bindings.insert(name, value);
    }
    append_where(&mut sql, clause, &mut bindings)?;

    Ok(Statement::new(sql, bindings))
}
