//! Named binding sets and marker expansion.
//!
//! Builders emit statements with named markers (`:name`, `:where_name`) and
//! record values in a [`Bindings`] set in insertion order. Just before
//! execution the markers are rewritten into the driver's positional
//! placeholders and the values laid out in appearance order.

use serde_json::Value;

use crate::dialect::Dialect;
use crate::errors::QueryError;

/// Ordered set of named bindings for one statement.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<(String, Value)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `marker` (without the leading colon) with its value.
    pub fn insert(&mut self, marker: impl Into<String>, value: Value) {
        self.entries.push((marker.into(), value));
    }

    pub fn get(&self, marker: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == marker)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn merge(&mut self, other: Bindings) {
        self.entries.extend(other.entries);
    }

    /// Whether `marker` is already taken, used to dedupe repeated columns.
    pub fn contains(&self, marker: &str) -> bool {
        self.get(marker).is_some()
    }

    /// Compact rendering for error messages and debug logs.
    pub fn describe(&self) -> String {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(name, value)| format!(":{}={}", name, value))
            .collect();
        format!("[{}]", parts.join(", "))
    }
}

/// Rewrite every `:marker` in `sql` into the dialect's positional
/// placeholder and return the values in appearance order.
///
/// A marker is a colon followed by `[A-Za-z_][A-Za-z0-9_]*`. Double colons
/// are left untouched so Postgres casts (`expr::text`) survive.
pub fn expand_markers(
    sql: &str,
    bindings: &Bindings,
    dialect: Dialect,
) -> Result<(String, Vec<Value>), QueryError> {
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::with_capacity(bindings.len());
    let chars: Vec<char> = sql.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != ':' {
            out.push(c);
            i += 1;
            continue;
        }
        // `::` is a cast, not a marker
        if chars.get(i + 1) == Some(&':') {
            out.push(':');
            out.push(':');
            i += 2;
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while end < chars.len() {
            let m = chars[end];
            let valid = if end == start {
                m.is_ascii_alphabetic() || m == '_'
            } else {
                m.is_ascii_alphanumeric() || m == '_'
            };
            if !valid {
                break;
            }
            end += 1;
        }
        if end == start {
            out.push(':');
            i += 1;
            continue;
        }
        let marker: String = chars[start..end].iter().collect();
        let value = bindings.get(&marker).ok_or_else(|| QueryError::UnboundMarker {
            marker: marker.clone(),
            sql: sql.to_string(),
        })?;
        values.push(value.clone());
        out.push_str(&dialect.placeholder(values.len()));
        i = end;
    }

    Ok((out, values))
}
