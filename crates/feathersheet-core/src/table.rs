use std::sync::Arc;

use crate::cell::CellValue;
use crate::convert::convert_values;
use crate::dtype::DataType;
use crate::error::TableError;
use crate::range::CellCoord;

/// A named, typed column.
///
/// Values sit behind an `Arc` so cloning a table shares storage; a write
/// copies only the column it touches.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: DataType,
    values: Arc<Vec<CellValue>>,
}

impl Column {
    /// Create a column, checking every value against the declared type
    pub fn new(
        name: impl Into<String>,
        dtype: DataType,
        values: Vec<CellValue>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        if values.iter().any(|v| !v.is_compatible_with(dtype)) {
            return Err(TableError::TypeMismatch { column: name, dtype });
        }
        Ok(Self {
            name,
            dtype,
            values: Arc::new(values),
        })
    }

    pub fn ints(name: impl Into<String>, values: &[i64]) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Int,
            values: Arc::new(values.iter().copied().map(CellValue::Int).collect()),
        }
    }

    pub fn floats(name: impl Into<String>, values: &[f64]) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Float,
            values: Arc::new(values.iter().copied().map(CellValue::Float).collect()),
        }
    }

    pub fn strs(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            dtype: DataType::Str,
            values: Arc::new(values.iter().map(|s| CellValue::Str(s.to_string())).collect()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether two columns share the same value storage
    pub fn shares_storage(&self, other: &Column) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

/// Rows of named, typed columns plus an ordered row-label index
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    index: Arc<Vec<String>>,
}

impl Table {
    /// Build a table with a positional row index
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        let index = (0..rows).map(|i| i.to_string()).collect();
        Self::with_index(columns, index)
    }

    /// Build a table with explicit row labels
    pub fn with_index(columns: Vec<Column>, index: Vec<String>) -> Result<Self, TableError> {
        let expected = index.len();
        for column in &columns {
            if column.len() != expected {
                return Err(TableError::ColumnLength {
                    column: column.name.clone(),
                    expected,
                    found: column.len(),
                });
            }
        }
        Ok(Self {
            columns,
            index: Arc::new(index),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, col: usize) -> Option<&Column> {
        self.columns.get(col)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn dtype(&self, col: usize) -> Option<DataType> {
        self.column(col).map(Column::dtype)
    }

    pub fn row_labels(&self) -> &[String] {
        &self.index
    }

    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.index.get(row).map(String::as_str)
    }

    /// Replace the label of one row, leaving columns untouched
    pub fn set_row_label(
        &mut self,
        row: usize,
        label: impl Into<String>,
    ) -> Result<(), TableError> {
        if row >= self.row_count() {
            return Err(TableError::OutOfBounds { row, col: 0 });
        }
        Arc::make_mut(&mut self.index)[row] = label.into();
        Ok(())
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row < self.row_count() && coord.col < self.column_count()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.columns.get(col)?.values.get(row)
    }

    /// Display string of a cell, `None` when out of bounds
    pub fn display(&self, row: usize, col: usize) -> Option<String> {
        let column = self.columns.get(col)?;
        column.values.get(row).map(|v| v.display(column.dtype))
    }

    /// Write a value that is already typed for its column
    pub fn set_value(
        &mut self,
        row: usize,
        col: usize,
        value: CellValue,
    ) -> Result<(), TableError> {
        if row >= self.row_count() || col >= self.column_count() {
            return Err(TableError::OutOfBounds { row, col });
        }
        let column = &mut self.columns[col];
        if !value.is_compatible_with(column.dtype) {
            return Err(TableError::TypeMismatch {
                column: column.name.clone(),
                dtype: column.dtype,
            });
        }
        Arc::make_mut(&mut column.values)[row] = value;
        Ok(())
    }

    /// Reinterpret a whole column under a new declared type
    pub fn convert_column(&mut self, col: usize, to: DataType) -> Result<(), TableError> {
        let column = self
            .columns
            .get_mut(col)
            .ok_or(TableError::OutOfBounds { row: 0, col })?;
        let converted = convert_values(&column.values, column.dtype, to);
        column.values = Arc::new(converted);
        column.dtype = to;
        Ok(())
    }

    /// Column header text, with the dtype appended when requested
    pub fn header(&self, col: usize, show_dtypes: bool) -> Option<String> {
        let column = self.columns.get(col)?;
        if show_dtypes {
            Some(format!("{} ({})", column.name, column.dtype))
        } else {
            Some(column.name.clone())
        }
    }
}
