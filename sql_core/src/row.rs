//! Driver rows to JSON maps.
//!
//! Result sets come back with whatever column types the table declares, so
//! decoding walks a fallback chain per column until one concrete type
//! sticks. Column order is preserved (the maps are insertion-ordered).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::{Column as _, Row as _};

/// One result row as an ordered column -> JSON value map.
pub type Row = serde_json::Map<String, Value>;

fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn pg_value(row: &PgRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map_or(Value::Null, Value::Bool);
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(index) {
        return v.map_or(Value::Null, |n| Value::from(n as i64));
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
        return v.map_or(Value::Null, |n| Value::from(n as i64));
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(Value::Null, Value::from);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(index) {
        return v.map_or(Value::Null, |n| number(n as f64));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map_or(Value::Null, number);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(Value::Null, Value::String);
    }
    if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(index) {
        return v.map_or(Value::Null, |t| Value::String(t.to_rfc3339()));
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(index) {
        return v.map_or(Value::Null, |t| {
            Value::String(t.format("%Y-%m-%d %H:%M:%S").to_string())
        });
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(index) {
        return v.map_or(Value::Null, |d| Value::String(d.format("%Y-%m-%d").to_string()));
    }
    if let Ok(v) = row.try_get::<Option<uuid::Uuid>, _>(index) {
        return v.map_or(Value::Null, |u| Value::String(u.to_string()));
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(index) {
        return v.unwrap_or(Value::Null);
    }
    Value::Null
}

fn mysql_value(row: &MySqlRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map_or(Value::Null, Value::Bool);
    }
    if let Ok(v) = row.try_get::<Option<i8>, _>(index) {
        return v.map_or(Value::Null, |n| Value::from(n as i64));
    }
    if let Ok(v) = row.try_get::<Option<i16>, _>(index) {
        return v.map_or(Value::Null, |n| Value::from(n as i64));
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(index) {
        return v.map_or(Value::Null, |n| Value::from(n as i64));
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(Value::Null, Value::from);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(index) {
        return v.map_or(Value::Null, Value::from);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(index) {
        return v.map_or(Value::Null, |n| number(n as f64));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map_or(Value::Null, number);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(Value::Null, Value::String);
    }
    if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(index) {
        return v.map_or(Value::Null, |t| Value::String(t.to_rfc3339()));
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(index) {
        return v.map_or(Value::Null, |t| {
            Value::String(t.format("%Y-%m-%d %H:%M:%S").to_string())
        });
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(index) {
        return v.map_or(Value::Null, |d| Value::String(d.format("%Y-%m-%d").to_string()));
    }
    if let Ok(v) = row.try_get::<Option<Value>, _>(index) {
        return v.unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return v
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .map_or(Value::Null, Value::String);
    }
    Value::Null
}

pub fn pg_row_to_map(row: &PgRow) -> Row {
    let mut map = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), pg_value(row, index));
    }
    map
}

pub fn mysql_row_to_map(row: &MySqlRow) -> Row {
    let mut map = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), mysql_value(row, index));
    }
    map
}
