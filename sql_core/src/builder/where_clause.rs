//! WHERE clause assembly.
//!
//! Conditions arrive either as column/value pairs or as a raw condition
//! string (`"idade >= 18 and nome = 'Ana'"`). Raw strings are parsed down to
//! column / operator / literal triples and the literals are re-bound as
//! parameters, so no caller-supplied value ever stays inline in the SQL.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::bindings::Bindings;
use crate::errors::BuildError;
use crate::ident::validate_segment;
use crate::ValueMap;

/// Two-character comparison operators, matched before their one-character
/// prefixes.
const WIDE_OPERATORS: &[&str] = &["!=", "<>", "<=", ">="];
const NARROW_OPERATORS: &[&str] = &["=", "<", ">"];

/// WHERE input for update, delete and paginated select statements.
#[derive(Debug, Clone, Default)]
pub enum Where {
    /// No conditions. Legal only for select; update and delete refuse it.
    #[default]
    None,
    /// Equality conditions joined with AND.
    Pairs(ValueMap),
    /// A raw condition string. Parsed, validated and re-bound.
    Raw(String),
}

impl Where {
    pub fn is_none(&self) -> bool {
        match self {
            Where::None => true,
            Where::Pairs(pairs) => pairs.is_empty(),
            Where::Raw(raw) => raw.trim().is_empty(),
        }
    }

    /// Rebuild a WHERE from the condition strings carried in a page token.
    pub fn from_conditions(conditions: &[String]) -> Where {
        if conditions.is_empty() {
            Where::None
        } else {
            Where::Raw(conditions.join(" AND "))
        }
    }
}

/// One parsed condition: column, operator, literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: String,
    pub value: Value,
}

impl Condition {
    /// Render back to the textual form carried inside page tokens.
    pub fn render(&self) -> String {
        match &self.value {
            Value::String(s) => {
                format!("{} {} '{}'", self.column, self.operator, s.replace('\'', "''"))
            }
            other => format!("{} {} {}", self.column, self.operator, other),
        }
    }
}

fn condition_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:where|and)\b").unwrap_or_else(|_| unreachable!()))
}

/// Locate the comparison operator of a fragment: the leftmost match
/// outside single quotes, so operator characters inside a quoted literal
/// never split the condition. Returns (byte offset, matched length,
/// normalized operator).
fn find_operator(fragment: &str) -> Option<(usize, usize, String)> {
    let mut in_quote = false;
    for (offset, c) in fragment.char_indices() {
        if c == '\'' {
            in_quote = !in_quote;
            continue;
        }
        if in_quote {
            continue;
        }
        let rest = &fragment[offset..];
        if rest
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case(" like "))
        {
            return Some((offset, " LIKE ".len(), "LIKE".to_string()));
        }
        for op in WIDE_OPERATORS {
            if rest.starts_with(op) {
                return Some((offset, op.len(), (*op).to_string()));
            }
        }
        for op in NARROW_OPERATORS {
            if rest.starts_with(op) {
                return Some((offset, op.len(), (*op).to_string()));
            }
        }
    }
    None
}

/// Parse one `column OP literal` fragment.
fn parse_condition(fragment: &str) -> Result<Condition, BuildError> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return Err(BuildError::InvalidIdentifier("(empty condition)".to_string()));
    }

    let (split_at, op_len, operator) = find_operator(fragment)
        .ok_or_else(|| BuildError::InvalidIdentifier(fragment.to_string()))?;

    let column = fragment[..split_at].trim().to_string();
    validate_segment(&column)?;

    let literal = fragment[split_at + op_len..].trim();
    Ok(Condition {
        column,
        operator,
        value: parse_literal(literal),
    })
}

/// Interpret a raw literal: quoted strings lose their quotes, numbers become
/// numbers, NULL becomes null, anything else is taken verbatim as a string.
fn parse_literal(literal: &str) -> Value {
    if literal.len() >= 2 && literal.starts_with('\'') && literal.ends_with('\'') {
        return Value::String(literal[1..literal.len() - 1].replace("''", "'"));
    }
    if literal.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if literal.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if literal.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(n) = literal.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = literal.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(literal.to_string())
}

/// Break a WHERE input down to its conditions.
pub fn conditions_of(clause: &Where) -> Result<Vec<Condition>, BuildError> {
    match clause {
        Where::None => Ok(Vec::new()),
        Where::Pairs(pairs) => pairs
            .iter()
            .map(|(column, value)| {
                validate_segment(column)?;
                Ok(Condition {
                    column: column.clone(),
                    operator: "=".to_string(),
                    value: value.clone(),
                })
            })
            .collect(),
        Where::Raw(raw) => condition_splitter()
            .split(raw)
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .map(parse_condition)
            .collect(),
    }
}

/// Append ` WHERE ...` to `sql`, binding every literal. Returns whether any
/// condition was appended. Repeated columns get a numeric marker suffix.
pub fn append_where(
    sql: &mut String,
    clause: &Where,
    bindings: &mut Bindings,
) -> Result<bool, BuildError> {
    let conditions = conditions_of(clause)?;
    if conditions.is_empty() {
        return Ok(false);
    }

    let mut parts = Vec::with_capacity(conditions.len());
    for condition in conditions {
        let mut marker = format!("where_{}", condition.column);
        let mut suffix = 2;
        while bindings.contains(&marker) {
            marker = format!("where_{}_{}", condition.column, suffix);
            suffix += 1;
        }
        parts.push(format!("{} {} :{}", condition.column, condition.operator, marker));
        bindings.insert(marker, condition.value);
    }

    sql.push_str(" WHERE ");
    sql.push_str(&parts.join(" AND "));
    Ok(true)
}

/// Render the condition strings that travel inside a page token.
pub fn conditions_for_state(clause: &Where) -> Result<Vec<String>, BuildError> {
    Ok(conditions_of(clause)?.iter().map(Condition::render).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pairs_bind_equality() {
        let mut sql = String::from("DELETE FROM usuarios");
        let mut bindings = Bindings::new();
        let clause = Where::Pairs(vec![
            ("nome".to_string(), json!("Ana")),
            ("idade".to_string(), json!(30)),
        ]);
        let appended = append_where(&mut sql, &clause, &mut bindings).unwrap();
        assert!(appended);
        assert_eq!(
            sql,
            "DELETE FROM usuarios WHERE nome = :where_nome AND idade = :where_idade"
        );
        assert_eq!(bindings.get("where_nome"), Some(&json!("Ana")));
        assert_eq!(bindings.get("where_idade"), Some(&json!(30)));
    }

    #[test]
    fn test_raw_clause_rebinds_literals() {
        let mut sql = String::from("SELECT * FROM usuarios");
        let mut bindings = Bindings::new();
        let clause = Where::Raw("where idade >= 18 and nome = 'Ana'".to_string());
        append_where(&mut sql, &clause, &mut bindings).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM usuarios WHERE idade >= :where_idade AND nome = :where_nome"
        );
        assert_eq!(bindings.get("where_idade"), Some(&json!(18)));
        assert_eq!(bindings.get("where_nome"), Some(&json!("Ana")));
    }

    #[test]
    fn test_raw_clause_without_keyword() {
        let clause = Where::Raw("ativo = true".to_string());
        let conditions = conditions_of(&clause).unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].value, json!(true));
    }

    #[test]
    fn test_like_operator() {
        let clause = Where::Raw("nome LIKE 'Ana%'".to_string());
        let conditions = conditions_of(&clause).unwrap();
        assert_eq!(conditions[0].operator, "LIKE");
        assert_eq!(conditions[0].value, json!("Ana%"));
    }

    #[test]
    fn test_repeated_column_gets_suffixed_marker() {
        let mut sql = String::from("SELECT * FROM t");
        let mut bindings = Bindings::new();
        let clause = Where::Raw("idade >= 18 and idade < 60".to_string());
        append_where(&mut sql, &clause, &mut bindings).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM t WHERE idade >= :where_idade AND idade < :where_idade_2"
        );
        assert_eq!(bindings.get("where_idade"), Some(&json!(18)));
        assert_eq!(bindings.get("where_idade_2"), Some(&json!(60)));
    }

    #[test]
    fn test_operator_inside_quoted_literal_does_not_split() {
        let clause = Where::Raw("nota = 'x != y'".to_string());
        let conditions = conditions_of(&clause).unwrap();
        assert_eq!(conditions[0].column, "nota");
        assert_eq!(conditions[0].operator, "=");
        assert_eq!(conditions[0].value, json!("x != y"));

        let clause = Where::Raw("descricao LIKE '% like %'".to_string());
        let conditions = conditions_of(&clause).unwrap();
        assert_eq!(conditions[0].operator, "LIKE");
        assert_eq!(conditions[0].value, json!("% like %"));
    }

    #[test]
    fn test_rejects_injection_in_column() {
        let clause = Where::Raw("1=1; DROP TABLE x = 1".to_string());
        assert!(conditions_of(&clause).is_err());
    }

    #[test]
    fn test_none_appends_nothing() {
        let mut sql = String::from("SELECT * FROM t");
        let mut bindings = Bindings::new();
        let appended = append_where(&mut sql, &Where::None, &mut bindings).unwrap();
        assert!(!appended);
        assert_eq!(sql, "SELECT * FROM t");
    }

    #[test]
    fn test_round_trip_through_condition_strings() {
        let clause = Where::Raw("idade >= 18 and nome = 'O''Hara'".to_string());
        let rendered = conditions_for_state(&clause).unwrap();
        assert_eq!(rendered, vec!["idade >= 18", "nome = 'O''Hara'"]);

        let rebuilt = Where::from_conditions(&rendered);
        let conditions = conditions_of(&rebuilt).unwrap();
        assert_eq!(conditions[1].value, json!("O'Hara"));
    }
}
