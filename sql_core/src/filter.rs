//! Value-set filtering against a table schema.
//!
//! Caller-supplied maps are never trusted: any key that is not a real column
//! of the target table is silently dropped, and identity columns are dropped
//! too so the database assigns them. Order of the surviving pairs follows
//! the caller's map.

use crate::schema::TableSchema;
use crate::ValueMap;

/// Keep only pairs whose key names a non-identity column of `schema`.
pub fn filter_values(schema: &TableSchema, values: &ValueMap) -> ValueMap {
    values
        .iter()
        .filter(|(key, _)| schema.contains(key) && !schema.is_identity(key))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::TableRef;
    use crate::schema::ColumnInfo;
    use serde_json::json;

    fn schema() -> TableSchema {
        TableSchema {
            table: TableRef::parse("public.usuarios").unwrap(),
            columns: vec![
                ColumnInfo {
                    name: "id".to_string(),
                    is_identity: true,
                },
                ColumnInfo {
                    name: "nome".to_string(),
                    is_identity: false,
                },
                ColumnInfo {
                    name: "idade".to_string(),
                    is_identity: false,
                },
            ],
        }
    }

    #[test]
    fn test_drops_unknown_keys() {
        let values = vec![
            ("nome".to_string(), json!("Ana")),
            ("senha".to_string(), json!("hunter2")),
        ];
        let kept = filter_values(&schema(), &values);
        assert_eq!(kept, vec![("nome".to_string(), json!("Ana"))]);
    }

    #[test]
    fn test_drops_identity_column() {
        let values = vec![
            ("id".to_string(), json!(99)),
            ("nome".to_string(), json!("Ana")),
        ];
        let kept = filter_values(&schema(), &values);
        assert_eq!(kept, vec![("nome".to_string(), json!("Ana"))]);
    }

    #[test]
    fn test_preserves_caller_order() {
        let values = vec![
            ("idade".to_string(), json!(30)),
            ("nome".to_string(), json!("Ana")),
        ];
        let kept = filter_values(&schema(), &values);
        assert_eq!(kept[0].0, "idade");
        assert_eq!(kept[1].0, "nome");
    }
}
