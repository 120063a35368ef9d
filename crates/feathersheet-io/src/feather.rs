//! Feather v2 (Arrow IPC file) reading and writing.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, DictionaryArray, Float64Array, Int64Array,
    StringArray, TimestampNanosecondArray,
};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{
    DataType as ArrowType, Field, Float64Type, Int32Type, Int64Type, Schema, TimeUnit,
    TimestampNanosecondType,
};
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::DateTime;
use feathersheet_core::{CellValue, Column, DataType, Table};

use crate::error::{IoError, Result};

/// Column name prefix dataframe writers use for a stored row index
const INDEX_PREFIX: &str = "__index_level_";
const INDEX_COLUMN: &str = "__index_level_0__";

/// Read a Feather file into a table
pub fn read_feather(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::io(path, e))?;
    let table = read_from(BufReader::new(file))?;
    tracing::info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "read feather file"
    );
    Ok(table)
}

/// Decode an Arrow IPC file from any seekable reader
pub fn read_from<R: Read + Seek>(reader: R) -> Result<Table> {
    let reader = FileReader::try_new(reader, None)?;
    let schema = reader.schema();
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;

    let mut columns = Vec::with_capacity(batch.num_columns());
    let mut index = None;
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        if index.is_none() && field.name().starts_with(INDEX_PREFIX) {
            index = Some(index_labels(array.as_ref())?);
            continue;
        }
        columns.push(column_from_arrow(field.name(), array)?);
    }

    let index =
        index.unwrap_or_else(|| (0..batch.num_rows()).map(|i| i.to_string()).collect());
    Ok(Table::with_index(columns, index)?)
}

/// Write a table as a Feather file.
///
/// Data goes to a sibling temporary file first and is renamed into place,
/// so a failed save leaves any existing file intact.
pub fn write_feather(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let tmp = temp_path(path);

    let written = File::create(&tmp)
        .map_err(|e| IoError::io(&tmp, e))
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write_to(table, &mut writer)?;
            writer.flush().map_err(|e| IoError::io(&tmp, e))
        })
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| IoError::io(path, e)));

    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        tracing::warn!(path = %path.display(), error = %err, "failed to write feather file");
        return Err(err);
    }

    tracing::info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "wrote feather file"
    );
    Ok(())
}

/// Encode a table as an Arrow IPC file
pub fn write_to<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut fields = Vec::with_capacity(table.column_count() + 1);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.column_count() + 1);

    if !is_positional(table.row_labels()) {
        fields.push(Field::new(INDEX_COLUMN, ArrowType::Utf8, false));
        arrays.push(Arc::new(StringArray::from_iter_values(table.row_labels())));
    }

    for column in table.columns() {
        let array = column_to_arrow(column);
        fields.push(Field::new(column.name(), array.data_type().clone(), true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(table.row_count()));
    let batch = RecordBatch::try_new_with_options(schema.clone(), arrays, &options)?;

    let mut writer = FileWriter::try_new(writer, &schema)?;
    writer.write(&batch)?;
    writer.finish()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

fn is_positional(labels: &[String]) -> bool {
    labels
        .iter()
        .enumerate()
        .all(|(i, label)| label.parse::<usize>() == Ok(i))
}

fn column_from_arrow(name: &str, array: &ArrayRef) -> Result<Column> {
    let (dtype, values) = match array.data_type() {
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32
        | ArrowType::UInt64 => {
            let ints = cast(array, &ArrowType::Int64)?;
            let values = ints
                .as_primitive::<Int64Type>()
                .iter()
                .map(|v| v.map(CellValue::Int).unwrap_or_default())
                .collect();
            (DataType::Int, values)
        }
        ArrowType::Float16 | ArrowType::Float32 | ArrowType::Float64 => {
            let floats = cast(array, &ArrowType::Float64)?;
            let values = floats
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.map(CellValue::Float).unwrap_or_default())
                .collect();
            (DataType::Float, values)
        }
        ArrowType::Boolean => {
            let values = array
                .as_boolean()
                .iter()
                .map(|v| v.map(CellValue::Bool).unwrap_or_default())
                .collect();
            (DataType::Bool, values)
        }
        ArrowType::Utf8 | ArrowType::LargeUtf8 | ArrowType::Utf8View => {
            (DataType::Str, strings(array, CellValue::Str)?)
        }
        ArrowType::Dictionary(_, value) if is_string_type(value) => {
            (DataType::Category, strings(array, CellValue::Category)?)
        }
        ArrowType::Timestamp(_, tz) => {
            let target = ArrowType::Timestamp(TimeUnit::Nanosecond, tz.clone());
            (DataType::Datetime, timestamps(array, &target)?)
        }
        ArrowType::Date32 | ArrowType::Date64 => {
            let target = ArrowType::Timestamp(TimeUnit::Nanosecond, None);
            (DataType::Datetime, timestamps(array, &target)?)
        }
        other => {
            tracing::debug!(column = name, arrow_type = %other, "reading column as text");
            (DataType::Str, formatted(array.as_ref())?)
        }
    };

    Ok(Column::new(name, dtype, values)?)
}

fn is_string_type(dtype: &ArrowType) -> bool {
    matches!(
        dtype,
        ArrowType::Utf8 | ArrowType::LargeUtf8 | ArrowType::Utf8View
    )
}

fn strings(array: &ArrayRef, wrap: fn(String) -> CellValue) -> Result<Vec<CellValue>> {
    let utf8 = cast(array, &ArrowType::Utf8)?;
    Ok(utf8
        .as_string::<i32>()
        .iter()
        .map(|v| v.map(|s| wrap(s.to_string())).unwrap_or_default())
        .collect())
}

fn timestamps(array: &ArrayRef, target: &ArrowType) -> Result<Vec<CellValue>> {
    let nanos = cast(array, target)?;
    Ok(nanos
        .as_primitive::<TimestampNanosecondType>()
        .iter()
        .map(|v| {
            v.map(|n| CellValue::Datetime(DateTime::from_timestamp_nanos(n).naive_utc()))
                .unwrap_or_default()
        })
        .collect())
}

fn formatted(array: &dyn Array) -> Result<Vec<CellValue>> {
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array, &options)?;
    Ok((0..array.len())
        .map(|i| {
            if array.is_null(i) {
                CellValue::Null
            } else {
                CellValue::Str(formatter.value(i).to_string())
            }
        })
        .collect())
}

fn index_labels(array: &dyn Array) -> Result<Vec<String>> {
    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array, &options)?;
    Ok((0..array.len())
        .map(|i| formatter.value(i).to_string())
        .collect())
}

fn column_to_arrow(column: &Column) -> ArrayRef {
    let values = column.values();
    match column.dtype() {
        DataType::Int => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    CellValue::Int(n) => Some(*n),
                    _ => None,
                })
                .collect::<Int64Array>(),
        ),
        DataType::Float => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    CellValue::Float(f) => Some(*f),
                    _ => None,
                })
                .collect::<Float64Array>(),
        ),
        DataType::Str => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    CellValue::Str(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect::<StringArray>(),
        ),
        DataType::Bool => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    CellValue::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<BooleanArray>(),
        ),
        DataType::Datetime => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    CellValue::Datetime(ts) => ts.and_utc().timestamp_nanos_opt(),
                    _ => None,
                })
                .collect::<TimestampNanosecondArray>(),
        ),
        DataType::Category => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    CellValue::Category(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect::<DictionaryArray<Int32Type>>(),
        ),
    }
}
