//! Schema inference over raw JSON records
//!
//! The inferred schema is the union of every field seen in any record.
//! Field order is alphabetical so that two reads of the same data agree.

use arrow::datatypes::{DataType, Field, Fields, Schema};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Accumulates the union schema of a stream of JSON objects
#[derive(Debug, Clone, Default)]
pub struct SchemaObserver {
    fields: BTreeMap<String, DataType>,
    records: usize,
}

impl SchemaObserver {
    /// Create an empty observer
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the schema
    ///
    /// Non-object values contribute no fields.
    pub fn observe(&mut self, record: &Value) {
        self.records += 1;
        if let Value::Object(obj) = record {
            for (key, value) in obj {
                self.add_field(key, json_type(value));
            }
        }
    }

    /// Fold another observer into this one
    pub fn merge(&mut self, other: SchemaObserver) {
        self.records += other.records;
        for (key, dtype) in other.fields {
            self.add_field(&key, dtype);
        }
    }

    fn add_field(&mut self, key: &str, dtype: DataType) {
        match self.fields.get_mut(key) {
            Some(existing) => *existing = widen(existing, &dtype),
            None => {
                self.fields.insert(key.to_string(), dtype);
            }
        }
    }

    /// Number of records observed
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Check whether a field was seen in any record
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Build the union schema; every field is nullable
    pub fn finish(&self) -> Schema {
        let fields: Vec<Field> = self
            .fields
            .iter()
            .map(|(name, dtype)| Field::new(name, dtype.clone(), true))
            .collect();
        Schema::new(fields)
    }
}

/// Arrow type of a single JSON value
fn json_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => DataType::Int64,
        Value::Number(_) => DataType::Float64,
        Value::String(_) => DataType::Utf8,
        Value::Array(items) => {
            let item = items
                .iter()
                .map(json_type)
                .reduce(|a, b| widen(&a, &b))
                .unwrap_or(DataType::Null);
            DataType::List(Arc::new(Field::new("item", item, true)))
        }
        Value::Object(obj) => DataType::Struct(Fields::from(
            obj.iter()
                .map(|(k, v)| Field::new(k, json_type(v), true))
                .collect::<Vec<_>>(),
        )),
    }
}

/// Smallest type both inputs fit in
fn widen(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        (a, b) if a == b => a.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }
        // Conflicting shapes degrade to their JSON text
        _ => DataType::Utf8,
    }
}
