use thiserror::Error;

use crate::dtype::DataType;

/// Errors raised by table reads, writes and conversions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// A raw value could not be coerced to the target type
    #[error("Cannot convert '{value}' to {target}")]
    Conversion { value: String, target: DataType },

    /// The requested type name is not one the converter knows
    #[error("Type '{0}' is not supported for conversion")]
    UnsupportedType(String),

    /// Address outside the current table extent
    #[error("Cell ({row}, {col}) is out of bounds")]
    OutOfBounds { row: usize, col: usize },

    /// A column does not have as many values as the table has rows
    #[error("Column '{column}' has {found} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A value does not belong in a column of this declared type
    #[error("Value does not match type {dtype} of column '{column}'")]
    TypeMismatch { column: String, dtype: DataType },
}

impl TableError {
    /// Short stable code for front-ends
    pub fn code(&self) -> &'static str {
        match self {
            TableError::Conversion { .. } => "CONVERSION",
            TableError::UnsupportedType(_) => "UNSUPPORTED_TYPE",
            TableError::OutOfBounds { .. } => "OUT_OF_BOUNDS",
            TableError::ColumnLength { .. } => "COLUMN_LENGTH",
            TableError::TypeMismatch { .. } => "TYPE_MISMATCH",
        }
    }
}
