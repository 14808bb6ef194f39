//! Conversion of untyped SQLite rows into JSON.
//!
//! The admin browser returns rows of arbitrary tables, so values are mapped by
//! their runtime storage class rather than through a typed model.

use serde_json::{Map, Number, Value};
use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Column, Decode, Row, Sqlite, TypeInfo, ValueRef};

use super::StoreError;

fn decode<'r, T: Decode<'r, Sqlite>>(
    value: SqliteValueRef<'r>,
    type_name: &'static str,
) -> Result<T, StoreError> {
    T::decode(value).map_err(|source| StoreError::Decode { type_name, source })
}

/// Maps one SQLite value onto JSON by its storage class.
///
/// REAL values that JSON cannot represent (NaN, infinities) become `null`.
/// BLOBs become arrays of byte values.
pub fn value_to_json(value: SqliteValueRef<'_>) -> Result<Value, StoreError> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    let storage = value.type_info().name().to_owned();
    match storage.as_str() {
        "NULL" => Ok(Value::Null),
        "INTEGER" => decode::<i64>(value, "INTEGER").map(Value::from),
        "REAL" => decode::<f64>(value, "REAL")
            .map(|f| Number::from_f64(f).map_or(Value::Null, Value::Number)),
        "TEXT" => decode::<String>(value, "TEXT").map(Value::String),
        "BLOB" => decode::<Vec<u8>>(value, "BLOB")
            .map(|bytes| Value::Array(bytes.into_iter().map(Value::from).collect())),
        _ => Err(StoreError::UnsupportedValue { type_name: storage }),
    }
}

/// Column names of a row, in select order.
pub fn column_names(row: &SqliteRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

/// Converts a row into a JSON object keyed by column name, preserving column order.
pub fn row_to_json(row: &SqliteRow) -> Result<Map<String, Value>, StoreError> {
    let mut object = Map::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(idx)?;
        object.insert(column.name().to_string(), value_to_json(raw)?);
    }
    Ok(object)
}

pub fn rows_to_json(rows: &[SqliteRow]) -> Result<Vec<Value>, StoreError> {
    rows.iter()
        .map(|row| row_to_json(row).map(Value::Object))
        .collect()
}
