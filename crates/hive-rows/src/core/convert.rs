use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};

use crate::core::types::{ColumnDesc, ColumnValue, WireRow};
use crate::error::{AppError, AppResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A converted cell. The variant always matches the column's declared type,
/// except that complex types (arrays, maps, structs, unions, intervals,
/// user-defined) are carried as their server-rendered text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Decimal(BigDecimal),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
}

pub type Row = Vec<Value>;

impl Value {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::from(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Text(s) => serde_json::Value::from(s.as_str()),
            Value::Bytes(b) => serde_json::Value::from(String::from_utf8_lossy(b).into_owned()),
            Value::Decimal(d) => serde_json::Value::from(d.to_string()),
            Value::Timestamp(ts) => serde_json::Value::from(ts.format(TIMESTAMP_FORMAT).to_string()),
            Value::Date(d) => serde_json::Value::from(d.format(DATE_FORMAT).to_string()),
        }
    }
}

pub fn convert_row(columns: &[ColumnDesc], row: &WireRow) -> AppResult<Row> {
    if row.col_vals.len() != columns.len() {
        return Err(AppError::Conversion {
            column: "*".into(),
            message: format!(
                "row has {} values but the schema has {} columns",
                row.col_vals.len(),
                columns.len()
            ),
        });
    }

    columns
        .iter()
        .zip(&row.col_vals)
        .map(|(col, cell)| convert_value(col, cell))
        .collect()
}

pub fn convert_value(column: &ColumnDesc, cell: &ColumnValue) -> AppResult<Value> {
    use crate::core::types::{ColumnType as T, ColumnValue as V};

    if cell.is_null() || column.column_type == T::Null {
        return Ok(Value::Null);
    }

    let v = match (column.column_type, cell) {
        (T::Boolean, V::Bool(Some(b))) => Value::Bool(*b),

        (T::TinyInt | T::SmallInt | T::Int | T::BigInt, V::Byte(Some(i))) => Value::Int(i64::from(*i)),
        (T::TinyInt | T::SmallInt | T::Int | T::BigInt, V::I16(Some(i))) => Value::Int(i64::from(*i)),
        (T::TinyInt | T::SmallInt | T::Int | T::BigInt, V::I32(Some(i))) => Value::Int(i64::from(*i)),
        (T::TinyInt | T::SmallInt | T::Int | T::BigInt, V::I64(Some(i))) => Value::Int(*i),

        (T::Float | T::Double, V::Double(Some(f))) => Value::Float(*f),

        (T::String | T::Varchar | T::Char, V::String(Some(s))) => Value::Text(s.clone()),

        (T::Decimal, V::String(Some(s))) => {
            Value::Decimal(BigDecimal::from_str(s.trim()).map_err(|e| parse_error(column, s, e))?)
        }
        (T::Timestamp, V::String(Some(s))) => Value::Timestamp(
            NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
                .map_err(|e| parse_error(column, s, e))?,
        ),
        (T::Date, V::String(Some(s))) => Value::Date(
            NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| parse_error(column, s, e))?,
        ),
        (T::Binary, V::String(Some(s))) => Value::Bytes(s.as_bytes().to_vec()),

        (
            T::Array
            | T::Map
            | T::Struct
            | T::Union
            | T::UserDefined
            | T::IntervalYearMonth
            | T::IntervalDayTime,
            V::String(Some(s)),
        ) => Value::Text(s.clone()),

        (declared, cell) => {
            return Err(AppError::Conversion {
                column: column.name.clone(),
                message: format!("declared {declared:?} but server sent a {} value", cell.kind()),
            })
        }
    };
    Ok(v)
}

fn parse_error(column: &ColumnDesc, raw: &str, e: impl std::fmt::Display) -> AppError {
    AppError::Conversion {
        column: column.name.clone(),
        message: format!("cannot parse {raw:?} as {:?}: {e}", column.column_type),
    }
}
