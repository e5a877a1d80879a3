//! Hive-style partition paths
//!
//! A partition directory is a sequence of `col=value` segments. Values are
//! rendered with Arrow's display formatting, nulls become
//! `__HIVE_DEFAULT_PARTITION__` and bytes outside `[A-Za-z0-9._-]` are
//! `%XX` escaped so any value fits in a single path segment.

use crate::error::{Error, Result};
use arrow::array::{new_null_array, Array, ArrayRef, StringArray, UInt32Array};
use arrow::compute::{cast_with_options, take_record_batch, CastOptions};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Directory value used for null partition values
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// Escape a partition value for use in a path segment
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }
    escaped
}

/// Reverse `escape_value`
///
/// Malformed escapes are kept literally.
pub fn unescape_value(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Directory for one combination of partition values
pub fn partition_path(columns: &[&str], values: &[Option<String>]) -> String {
    columns
        .iter()
        .zip(values)
        .map(|(column, value)| match value {
            Some(v) => format!("{column}={}", escape_value(v)),
            None => format!("{column}={HIVE_DEFAULT_PARTITION}"),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Partition values encoded in a file path, outermost first
///
/// Only directory segments of the form `col=value` are considered.
pub fn parse_partition_values(path: &str) -> Vec<(String, Option<String>)> {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();

    segments
        .into_iter()
        .filter_map(|segment| segment.split_once('='))
        .map(|(column, value)| {
            let value = (value != HIVE_DEFAULT_PARTITION).then(|| unescape_value(value));
            (column.to_string(), value)
        })
        .collect()
}

/// Split a batch into one batch per distinct partition
///
/// Partitions come back sorted by path; rows keep their original order
/// within each partition. With no partition columns the whole batch is a
/// single partition at path `""`.
pub fn split_by_partition(
    batch: &RecordBatch,
    partition_by: &[&str],
) -> Result<Vec<(String, RecordBatch)>> {
    if partition_by.is_empty() {
        return Ok(vec![(String::new(), batch.clone())]);
    }

    let options = FormatOptions::default();
    let mut formatters = Vec::with_capacity(partition_by.len());
    let mut arrays = Vec::with_capacity(partition_by.len());
    for name in partition_by {
        let array = batch
            .column_by_name(name)
            .ok_or_else(|| Error::Other(format!("partition column '{name}' not in batch")))?;
        formatters.push(ArrayFormatter::try_new(array.as_ref(), &options)?);
        arrays.push(array);
    }

    let mut groups: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for row in 0..batch.num_rows() {
        let values: Vec<Option<String>> = arrays
            .iter()
            .zip(&formatters)
            .map(|(array, formatter)| {
                (!array.is_null(row)).then(|| formatter.value(row).to_string())
            })
            .collect();
        let index = u32::try_from(row)
            .map_err(|_| Error::Other(format!("batch too large to partition: {row} rows")))?;
        groups
            .entry(partition_path(partition_by, &values))
            .or_default()
            .push(index);
    }

    groups
        .into_iter()
        .map(|(path, indices)| {
            let part = take_record_batch(batch, &UInt32Array::from(indices))?;
            Ok((path, part))
        })
        .collect()
}

/// Remove the named columns from a batch
pub fn drop_columns(batch: &RecordBatch, columns: &[&str]) -> Result<RecordBatch> {
    let keep: Vec<usize> = batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| !columns.contains(&field.name().as_str()))
        .map(|(i, _)| i)
        .collect();
    Ok(batch.project(&keep)?)
}

/// Append partition columns recovered from a file path
///
/// Columns already present in the batch are left alone. Each restored
/// column takes its type from `target` when it names the column, else it
/// stays a string column.
pub fn restore_columns(
    batch: &RecordBatch,
    values: &[(String, Option<String>)],
    target: Option<&Schema>,
) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    for (name, value) in values {
        if schema.column_with_name(name).is_some() {
            continue;
        }
        let data_type = target
            .and_then(|t| t.field_with_name(name).ok())
            .map_or(DataType::Utf8, |f| f.data_type().clone());

        let column = match value {
            Some(v) => {
                let strings: ArrayRef = Arc::new(StringArray::from(vec![
                    v.as_str();
                    batch.num_rows()
                ]));
                let options = CastOptions {
                    safe: false,
                    ..CastOptions::default()
                };
                cast_with_options(&strings, &data_type, &options).map_err(|e| {
                    Error::Other(format!("partition value '{v}' for '{name}': {e}"))
                })?
            }
            None => new_null_array(&data_type, batch.num_rows()),
        };

        fields.push(Field::new(name, data_type, true));
        columns.push(column);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
