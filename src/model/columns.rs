//! Typed column access for decoding persisted batches

use crate::error::{Error, Result};
use arrow::array::{Array, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;

/// Arrow type of every timestamp column
pub(crate) fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
}

/// Look up a column by name and downcast it
pub(crate) fn column<'a, A: Array + 'static>(
    table: &str,
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a A> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| Error::join(table, format!("missing column '{name}'")))?;

    column.as_any().downcast_ref::<A>().ok_or_else(|| {
        Error::join(
            table,
            format!("column '{name}' has unexpected type {}", column.data_type()),
        )
    })
}

/// Non-null string value at `row`
pub(crate) fn required_str(
    table: &str,
    array: &StringArray,
    name: &str,
    row: usize,
) -> Result<String> {
    if array.is_null(row) {
        return Err(Error::join(table, format!("null '{name}' in row {row}")));
    }
    Ok(array.value(row).to_string())
}

pub(crate) fn opt_str(array: &StringArray, row: usize) -> Option<String> {
    (!array.is_null(row)).then(|| array.value(row).to_string())
}

pub(crate) fn opt_i32(array: &Int32Array, row: usize) -> Option<i32> {
    (!array.is_null(row)).then(|| array.value(row))
}

pub(crate) fn opt_f64(array: &Float64Array, row: usize) -> Option<f64> {
    (!array.is_null(row)).then(|| array.value(row))
}
