//! Statement classification and safety guards.

use crate::errors::BuildError;

/// Statement families the executor knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Describe,
    Create,
    Alter,
}

/// Classify a statement by its leading keyword.
pub fn classify(sql: &str) -> Option<StatementKind> {
    let first = sql.trim_start().split_whitespace().next()?;
    match first.to_ascii_uppercase().as_str() {
        "SELECT" => Some(StatementKind::Select),
        "INSERT" => Some(StatementKind::Insert),
        "UPDATE" => Some(StatementKind::Update),
        "DELETE" => Some(StatementKind::Delete),
        "DESCRIBE" | "SHOW" => Some(StatementKind::Describe),
        "CREATE" => Some(StatementKind::Create),
        "ALTER" => Some(StatementKind::Alter),
        _ => None,
    }
}

/// Refuse anything outside the supported statement families.
pub fn ensure_supported(sql: &str) -> Result<StatementKind, BuildError> {
    classify(sql).ok_or_else(|| {
        let verb = sql
            .trim_start()
            .split_whitespace()
            .next()
            .unwrap_or("(empty)")
            .to_string();
        BuildError::UnsupportedStatement(verb)
    })
}

/// Unconditional deletes are refused outright.
pub fn ensure_delete_has_where(sql: &str) -> Result<(), BuildError> {
    if classify(sql) != Some(StatementKind::Delete) {
        return Ok(());
    }
    let has_where = sql
        .split_whitespace()
        .any(|token| token.eq_ignore_ascii_case("where"));
    if has_where {
        Ok(())
    } else {
        Err(BuildError::DeleteWithoutWhere)
    }
}

/// Best-effort extraction of the target table from a statement, used for
/// diagnostics and the MySQL insert re-select.
pub fn table_from_query(sql: &str) -> Option<String> {
    let tokens: Vec<&str> = sql.split_whitespace().collect();
    for (index, token) in tokens.iter().enumerate() {
        let upper = token.to_ascii_uppercase();
        let target = match upper.as_str() {
            "FROM" | "INTO" | "UPDATE" => tokens.get(index + 1),
            _ => continue,
        };
        if let Some(name) = target {
            let cleaned = name.trim_matches(|c| c == '`' || c == '"' || c == ';' || c == '(');
            if !cleaned.is_empty() {
                return Some(cleaned.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_verbs() {
        assert_eq!(classify("SELECT * FROM t"), Some(StatementKind::Select));
        assert_eq!(classify("  insert into t values (1)"), Some(StatementKind::Insert));
        assert_eq!(classify("SHOW COLUMNS FROM t"), Some(StatementKind::Describe));
        assert_eq!(classify("TRUNCATE t"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_ensure_supported_rejects_truncate() {
        let err = ensure_supported("TRUNCATE usuarios").unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedStatement(v) if v == "TRUNCATE"));
    }

    #[test]
    fn test_delete_without_where_is_refused() {
        assert!(ensure_delete_has_where("DELETE FROM usuarios").is_err());
        assert!(ensure_delete_has_where("DELETE FROM usuarios WHERE id = :where_id").is_ok());
        assert!(ensure_delete_has_where("SELECT * FROM usuarios").is_ok());
    }

    #[test]
    fn test_table_from_query() {
        assert_eq!(
            table_from_query("SELECT * FROM public.usuarios WHERE id = 1"),
            Some("public.usuarios".to_string())
        );
        assert_eq!(
            table_from_query("INSERT INTO `usuarios` (a) VALUES (1)"),
            Some("usuarios".to_string())
        );
        assert_eq!(
            table_from_query("UPDATE usuarios SET a = 1"),
            Some("usuarios".to_string())
        );
        assert_eq!(table_from_query("SHOW TABLES"), None);
    }
}
