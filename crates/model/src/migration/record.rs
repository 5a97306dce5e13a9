use crate::migration::status::MigrationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ledger row. Created once with status `running`, updated exactly once
/// more at the terminal transition; history queries only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub id: String,
    pub source: String,
    pub destination: String,
    pub source_table: String,
    pub migration_time: DateTime<Utc>,
    pub description: String,
    pub table_fields: Vec<String>,
    /// JSON-serialized mapping plan, kept opaque so old rows stay readable
    /// across plan format changes.
    pub field_mappings: String,
    pub status: MigrationStatus,
    pub records_migrated: u64,
    #[serde(default)]
    pub error_message: Option<String>,
    pub duration_seconds: u32,
    pub created_by: String,
    #[serde(default = "default_metadata")]
    pub metadata: String,
}

fn default_metadata() -> String {
    "{}".to_string()
}
