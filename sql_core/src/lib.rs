//! SQL Core - Schema-driven statement building and execution for Tablewerk
//!
//! This crate is the data-access engine: it introspects table schemas so
//! arbitrary field/value maps can be filtered and bound safely, assembles
//! parameterized INSERT / UPDATE / SELECT / DELETE statements across the two
//! supported dialects, and executes them with result classification.
//!
//! Callers never interpolate values into SQL text: builders emit named
//! markers (`:name`) and an ordered binding set, and the executor rewrites
//! the markers into the driver's positional placeholders immediately before
//! execution.

pub mod bindings;
pub mod builder;
pub mod dialect;
pub mod errors;
pub mod executor;
pub mod filter;
pub mod ident;
pub mod row;
pub mod schema;

pub use bindings::Bindings;
pub use builder::guard::{self, StatementKind};
pub use builder::where_clause::Where;
pub use dialect::Dialect;
pub use errors::{BuildError, QueryError, SchemaError};
pub use executor::{DbPool, ExecOutcome, Executor};
pub use ident::TableRef;
pub use row::Row;
pub use schema::{ColumnInfo, LiveSchema, SchemaSource, TableSchema};

/// An ordered column -> value map supplied by callers. Never trusted: every
/// key must survive schema filtering before it reaches a statement.
pub type ValueMap = Vec<(String, serde_json::Value)>;
