use crate::schema::column::ColumnDefinition;
use serde::{Deserialize, Serialize};

/// Source table schema, produced once per migration request and never
/// mutated afterwards. `row_count` is a point-in-time snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub schema_name: String,
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub estimated_size_mb: Option<f64>,
}
