//! Rule-chain grammar: `rule` or `rule:arg1,arg2`, chained with `|`.

use crate::errors::ValidationError;

/// One parsed rule with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub name: String,
    pub args: Vec<String>,
}

impl RuleSpec {
    /// Parse a single `name` or `name:arg1,arg2` declaration.
    ///
    /// The `regex` rule keeps everything after the first `:` as one argument
    /// so patterns containing commas survive.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::BadRule("empty rule in chain".to_string()));
        }

        let (name, rest) = match raw.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (raw, None),
        };

        if name.is_empty() {
            return Err(ValidationError::BadRule(raw.to_string()));
        }

        let args = match rest {
            None => Vec::new(),
            Some(rest) if name == "regex" => vec![rest.to_string()],
            Some(rest) => rest.split(',').map(|a| a.trim().to_string()).collect(),
        };

        Ok(Self {
            name: name.to_string(),
            args,
        })
    }
}

/// An ordered sequence of rules declared for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleChain {
    pub rules: Vec<RuleSpec>,
}

impl RuleChain {
    /// Parse a pipe-separated chain, preserving declaration order.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let rules = raw
            .split('|')
            .map(RuleSpec::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if rules.is_empty() {
            return Err(ValidationError::BadRule(raw.to_string()));
        }

        Ok(Self { rules })
    }
}
