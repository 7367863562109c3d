//! DELETE builder.

use crate::builder::where_clause::{append_where, Where};
use crate::builder::Statement;
use crate::bindings::Bindings;
use crate::errors::BuildError;
use crate::ident::TableRef;

/// Build `DELETE FROM t WHERE ...`. A delete with no conditions would wipe
/// the table, so it is refused before any SQL is assembled.
pub fn build_delete(table: &TableRef, clause: &Where) -> Result<Statement, BuildError> {
    if clause.is_none() {
        return Err(BuildError::DeleteWithoutWhere);
    }

    let mut sql = format!("DELETE FROM {}", table.qualified());
    let mut bindings = Bindings::new();
    append_where(&mut sql, clause, &mut bindings)?;

    Ok(Statement::new(sql, bindings))
}
