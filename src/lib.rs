//! # Tablewerk
//!
//! A schema-driven data-access layer for PostgreSQL and MySQL: filtered
//! statement building from untrusted field maps, stateless encrypted
//! pagination tokens, and a rule-chain input validator.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tablewerk::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let werk = Tablewerk::connect(&config).await?;
//!
//!     let mut input = serde_json::Map::new();
//!     input.insert("nome".to_string(), json!("Ana"));
//!     input.insert("senha".to_string(), json!("hunter22"));
//!     werk.validate(&input, &[("nome", "required"), ("senha", "required|between:6,16")])?;
//!
//!     let values: ValueMap = input.into_iter().collect();
//!     let stored = werk.insert("public.usuarios", &values).await?;
//!     println!("stored {} row(s)", stored.len());
//!
//!     let first = werk.paginate_first_page("public.usuarios", &Where::None, 25).await?;
//!     let page_two = werk.paginate_page(&first.token, 2).await?;
//!     println!("page 2 has {} row(s)", page_two.len());
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::{FirstPage, Tablewerk};
pub use errors::TablewerkError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, DatabaseKind, TokenConfig};

// Re-export member crates for direct access to the building blocks
pub use paginate_token;
pub use rule_engine;
pub use sql_core;

// Re-export external dependencies used in public API
pub use serde_json;
pub use sqlx;
