use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TableError;

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Float,
    Str,
    Bool,
    Datetime,
    Category,
}

impl DataType {
    /// Every type offered by the type picker, in picker order
    pub const ALL: [DataType; 6] = [
        DataType::Int,
        DataType::Float,
        DataType::Str,
        DataType::Datetime,
        DataType::Bool,
        DataType::Category,
    ];

    /// Dtype name as shown in column headers
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int64",
            DataType::Float => "float64",
            DataType::Str => "object",
            DataType::Bool => "bool",
            DataType::Datetime => "datetime64[ns]",
            DataType::Category => "category",
        }
    }

    /// Short name accepted by `from_str`
    pub fn simple_name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Str => "str",
            DataType::Bool => "bool",
            DataType::Datetime => "datetime",
            DataType::Category => "category",
        }
    }

    /// Map any dtype description onto the closest simple type.
    ///
    /// Unknown descriptions fall back to `Str`.
    pub fn simplify(description: &str) -> DataType {
        let description = description.to_lowercase();
        if description.contains("int") {
            DataType::Int
        } else if description.contains("float") {
            DataType::Float
        } else if description.contains("datetime") {
            DataType::Datetime
        } else if description.contains("bool") {
            DataType::Bool
        } else if description.contains("category") {
            DataType::Category
        } else {
            DataType::Str
        }
    }

    /// Display token used for a missing value in a column of this type
    pub fn null_token(&self) -> &'static str {
        match self {
            DataType::Int => "<NA>",
            DataType::Float => "nan",
            DataType::Datetime => "NaT",
            DataType::Str | DataType::Bool | DataType::Category => "None",
        }
    }
}

impl FromStr for DataType {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "int" => Ok(DataType::Int),
            "float" => Ok(DataType::Float),
            "str" | "string" => Ok(DataType::Str),
            "datetime" => Ok(DataType::Datetime),
            "bool" | "boolean" => Ok(DataType::Bool),
            "category" => Ok(DataType::Category),
            other => Err(TableError::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
