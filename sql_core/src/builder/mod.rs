//! Statement builders.
//!
//! Every builder yields a [`Statement`]: SQL text with named markers plus
//! the ordered binding set. Nothing caller-supplied is ever inlined except
//! validated identifiers and computed limit/offset literals.

pub mod delete;
pub mod guard;
pub mod insert;
pub mod select;
pub mod update;
pub mod where_clause;

use crate::bindings::Bindings;

/// A built statement ready for marker expansion and execution.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub bindings: Bindings,
}

impl Statement {
    pub fn new(sql: String, bindings: Bindings) -> Self {
        Self { sql, bindings }
    }
}
