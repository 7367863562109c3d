use thiserror::Error;

/// One field's first failing rule, as collected in aggregating mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug)]
pub enum ValidationError {
    /// First failing rule in fail-fast mode; carries the field-scoped message.
    #[error("{message}")]
    Failed { field: String, message: String },

    /// All collected failures in aggregating mode, one per failing field.
    #[error("{} field(s) failed validation", .0.len())]
    Aggregate(Vec<FieldFailure>),

    #[error("No input data supplied for validation")]
    EmptyInput,

    #[error("Unknown validation rule: {0}")]
    UnknownRule(String),

    #[error("Malformed rule declaration: {0}")]
    BadRule(String),
}
