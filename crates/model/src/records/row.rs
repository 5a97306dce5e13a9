use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// One row travelling through the pipeline: ordered field-name/value pairs.
/// Order is the source projection order on extract and the mapping order
/// after transform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RowData {
    pub fields: Vec<(String, Value)>,
}

impl RowData {
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        RowData { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn push(&mut self, field: &str, value: Value) {
        self.fields.push((field.to_string(), value));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
