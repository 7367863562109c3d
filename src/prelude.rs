//! Convenience re-exports for common Tablewerk usage
//!
//! # Example
//!
//! ```rust
//! use tablewerk::prelude::*;
//! ```

// Core Tablewerk components
pub use crate::core::{FirstPage, Tablewerk};
pub use crate::errors::TablewerkError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, DatabaseKind, TokenConfig};

// Statement building blocks
pub use sql_core::{
    Bindings, DbPool, Dialect, ExecOutcome, Executor, Row, TableRef, ValueMap, Where,
};

// Pagination tokens
pub use paginate_token::{PageState, PageToken, TokenCodec};

// Validation
pub use rule_engine::{RuleChain, ValidationError, ValidationMode, Validator};

// Common external dependencies
pub use serde_json;
pub use sqlx;
pub use tokio;
