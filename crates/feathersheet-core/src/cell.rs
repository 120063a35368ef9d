use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::dtype::DataType;
use crate::error::TableError;

/// Timestamp layouts accepted on input, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// A single value stored in a table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Datetime(NaiveDateTime),
    Category(String),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Whether this value may live in a column of the given declared type
    pub fn is_compatible_with(&self, dtype: DataType) -> bool {
        matches!(
            (self, dtype),
            (CellValue::Null, _)
                | (CellValue::Int(_), DataType::Int)
                | (CellValue::Float(_), DataType::Float)
                | (CellValue::Str(_), DataType::Str)
                | (CellValue::Bool(_), DataType::Bool)
                | (CellValue::Datetime(_), DataType::Datetime)
                | (CellValue::Category(_), DataType::Category)
        )
    }

    /// Display/edit string. Nulls render with the column type's token.
    pub fn display(&self, dtype: DataType) -> String {
        match self {
            CellValue::Null => dtype.null_token().to_string(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(f) => format_float(*f),
            CellValue::Str(s) | CellValue::Category(s) => s.clone(),
            CellValue::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            CellValue::Datetime(ts) => format_timestamp(ts),
        }
    }

    /// Numeric view used by column conversions
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(n) => Some(*n as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Str(s) | CellValue::Category(s) => parse_float(s),
            CellValue::Datetime(ts) => ts.and_utc().timestamp_nanos_opt().map(|n| n as f64),
            CellValue::Null => None,
        }
    }
}

/// Float formatting that always shows a fractional part
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let token = if value > 0.0 { "inf" } else { "-inf" };
        token.to_string()
    } else {
        format!("{:?}", value)
    }
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

pub fn parse_float(input: &str) -> Option<f64> {
    input.trim().parse::<f64>().ok()
}

/// Parse an integer, accepting integral float literals such as `3.0`
pub fn parse_int(input: &str) -> Option<i64> {
    let input = input.trim();
    if let Ok(n) = input.parse::<i64>() {
        return Some(n);
    }
    integral_float(input.parse::<f64>().ok()?)
}

/// Exact `i64` for a finite, integral float inside the `i64` range
pub(crate) fn integral_float(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

pub fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(input, format) {
            return Some(ts);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Coerce a raw edit string into a value for a column of type `dtype`
pub fn coerce_input(raw: &str, dtype: DataType) -> Result<CellValue, TableError> {
    let fail = || TableError::Conversion {
        value: raw.to_string(),
        target: dtype,
    };

    if dtype != DataType::Str && raw.trim() == dtype.null_token() {
        return Ok(CellValue::Null);
    }

    match dtype {
        DataType::Int => parse_int(raw).map(CellValue::Int).ok_or_else(fail),
        DataType::Float => parse_float(raw).map(CellValue::Float).ok_or_else(fail),
        DataType::Datetime => parse_timestamp(raw)
            .map(CellValue::Datetime)
            .ok_or_else(fail),
        DataType::Bool => parse_bool(raw).map(CellValue::Bool).ok_or_else(fail),
        DataType::Str => Ok(CellValue::Str(raw.to_string())),
        DataType::Category => Ok(CellValue::Category(raw.to_string())),
    }
}
