//! Chain execution over an input map.

use serde_json::{Map, Value};

use crate::chain::RuleChain;
use crate::errors::{FieldFailure, ValidationError};
use crate::rules::{Registry, RuleContext, RuleOutcome};

/// How failures propagate across fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// The first failing rule of any field aborts the entire call. This is
    /// the inherited contract of the engine, not an oversight: callers rely
    /// on a single field-scoped message.
    #[default]
    FailFast,
    /// Collect the first failure of every failing field, then report all of
    /// them together.
    Aggregate,
}

/// Rule-chain validation engine.
///
/// Per field the loop is: `optional` short-circuits the remaining chain when
/// the key is entirely absent from the input, `nullable` when it is present
/// but null; neither marks the field failed. Every other rule dispatches
/// through the registry in declared order.
pub struct Validator {
    registry: Registry,
    mode: ValidationMode,
}

impl Validator {
    /// Engine with the default rule set, failing fast across fields.
    pub fn new() -> Self {
        Self {
            registry: Registry::with_defaults(),
            mode: ValidationMode::FailFast,
        }
    }

    /// Engine with a caller-supplied registry.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            mode: ValidationMode::FailFast,
        }
    }

    /// Select the failure-propagation strategy.
    pub fn mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Register an additional rule on this engine.
    pub fn register<C>(&mut self, name: impl Into<String>, check: C)
    where
        C: crate::rules::RuleCheck + 'static,
    {
        self.registry.register(name, check);
    }

    /// Validate `data` against per-field rule chains, in declaration order.
    ///
    /// Returns the last executed rule outcome on success (inherited
    /// contract). Fails with the field-scoped message of the first failing
    /// rule, or with every field's first failure in aggregating mode.
    pub fn validate(
        &self,
        data: &Map<String, Value>,
        rules: &[(&str, &str)],
    ) -> Result<RuleOutcome, ValidationError> {
        if data.is_empty() && !rules.is_empty() {
            return Err(ValidationError::EmptyInput);
        }

        let mut last = RuleOutcome::pass();
        let mut failures: Vec<FieldFailure> = Vec::new();

        'fields: for (field, declaration) in rules {
            let chain = RuleChain::parse(declaration)?;
            let value = data.get(*field);

            for rule in &chain.rules {
                let absent = !data.contains_key(*field);
                let null = matches!(value, Some(Value::Null));

                // optional / nullable silence the rest of the chain without
                // failing the field
                if (rule.name == "optional" && absent) || (rule.name == "nullable" && null) {
                    continue 'fields;
                }
                if rule.name == "optional" || rule.name == "nullable" {
                    continue;
                }

                let Some(check) = self.registry.get(&rule.name) else {
                    return Err(ValidationError::UnknownRule(rule.name.clone()));
                };

                let ctx = RuleContext {
                    field,
                    value,
                    args: &rule.args,
                    data,
                };
                let outcome = check.check(&ctx);

                if !outcome.valid {
                    tracing::debug!(field, rule = %rule.name, message = %outcome.message, "rule failed");
                    match self.mode {
                        ValidationMode::FailFast => {
                            return Err(ValidationError::Failed {
                                field: field.to_string(),
                                message: outcome.message,
                            });
                        }
                        ValidationMode::Aggregate => {
                            failures.push(FieldFailure {
                                field: field.to_string(),
                                message: outcome.message,
                            });
                            continue 'fields;
                        }
                    }
                }

                last = outcome;
            }
        }

        if !failures.is_empty() {
            return Err(ValidationError::Aggregate(failures));
        }

        Ok(last)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
