//! Whole-column reinterpretation under a new declared type.
//!
//! Per-value failures become nulls instead of aborting the conversion.
//! Boolean conversion is a truthiness cast and never produces nulls.

use chrono::{DateTime, NaiveDateTime};

use crate::cell::{integral_float, parse_float, parse_int, parse_timestamp, CellValue};
use crate::dtype::DataType;

/// Convert every value of a column from `from` to `to`
pub fn convert_values(values: &[CellValue], from: DataType, to: DataType) -> Vec<CellValue> {
    values.iter().map(|value| convert_value(value, from, to)).collect()
}

/// Convert a single value; `from` supplies the display form of nulls
pub fn convert_value(value: &CellValue, from: DataType, to: DataType) -> CellValue {
    match to {
        DataType::Int => to_int(value),
        DataType::Float => value
            .as_f64()
            .map(CellValue::Float)
            .unwrap_or(CellValue::Null),
        DataType::Str => CellValue::Str(value.display(from)),
        DataType::Datetime => to_datetime(value),
        DataType::Bool => CellValue::Bool(truthiness(value, from)),
        DataType::Category => match value {
            CellValue::Null => CellValue::Null,
            other => CellValue::Category(other.display(from)),
        },
    }
}

fn to_int(value: &CellValue) -> CellValue {
    match value {
        CellValue::Int(n) => CellValue::Int(*n),
        CellValue::Bool(b) => CellValue::Int(i64::from(*b)),
        CellValue::Datetime(ts) => ts
            .and_utc()
            .timestamp_nanos_opt()
            .map(CellValue::Int)
            .unwrap_or(CellValue::Null),
        CellValue::Str(s) | CellValue::Category(s) => {
            parse_int(s).map(CellValue::Int).unwrap_or(CellValue::Null)
        }
        other => other
            .as_f64()
            .and_then(integral_float)
            .map(CellValue::Int)
            .unwrap_or(CellValue::Null),
    }
}

fn to_datetime(value: &CellValue) -> CellValue {
    let ts = match value {
        CellValue::Datetime(ts) => Some(*ts),
        CellValue::Int(n) => Some(from_epoch_nanos(*n)),
        CellValue::Float(f) if f.is_finite() => Some(from_epoch_nanos(*f as i64)),
        CellValue::Str(s) | CellValue::Category(s) => {
            parse_timestamp(s).or_else(|| parse_float(s).map(|f| from_epoch_nanos(f as i64)))
        }
        _ => None,
    };
    ts.map(CellValue::Datetime).unwrap_or(CellValue::Null)
}

fn from_epoch_nanos(nanos: i64) -> NaiveDateTime {
    DateTime::from_timestamp_nanos(nanos).naive_utc()
}

/// A missing float is NaN, which is truthy; other missing values are falsy
fn truthiness(value: &CellValue, from: DataType) -> bool {
    match value {
        CellValue::Null => from == DataType::Float,
        CellValue::Int(n) => *n != 0,
        CellValue::Float(f) => *f != 0.0,
        CellValue::Bool(b) => *b,
        CellValue::Str(s) | CellValue::Category(s) => !s.is_empty(),
        CellValue::Datetime(_) => true,
    }
}
