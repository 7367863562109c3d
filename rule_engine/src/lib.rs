//! Rule Engine - Declarative rule-chain validation for Tablewerk
//!
//! Parses per-field rule strings such as `"required|between:6,16"` and
//! executes them against arbitrary input maps, producing structured,
//! field-scoped error messages.
//!
//! ```rust
//! use rule_engine::Validator;
//! use serde_json::json;
//!
//! let validator = Validator::new();
//! let data = json!({"email": "a@b.com", "age": 30});
//! let result = validator.validate(
//!     data.as_object().unwrap(),
//!     &[("email", "required|email"), ("age", "required|numeric")],
//! );
//! assert!(result.is_ok());
//! ```
//!
//! Rules dispatch through a registry mapping rule name to check function,
//! so new rules can be added without touching a central dispatcher. The
//! default strategy fails fast: the first failing rule of any field aborts
//! the whole call. An aggregating strategy that collects one failure per
//! field is available through [`ValidationMode`].

pub mod chain;
pub mod dates;
pub mod engine;
pub mod errors;
pub mod rules;

pub use chain::{RuleChain, RuleSpec};
pub use engine::{ValidationMode, Validator};
pub use errors::{FieldFailure, ValidationError};
pub use rules::{Registry, RuleCheck, RuleContext, RuleOutcome};
