use crate::mapping::FieldMapping;
use serde::{Deserialize, Serialize};

/// Explicit source endpoint for a single request; when absent the default
/// configured Postgres connection is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConnection {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl SourceConnection {
    /// Credential-free descriptor recorded in the ledger and logs.
    pub fn endpoint(&self) -> String {
        format!("postgres://{}:{}/{}", self.host, self.port, self.database)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRequest {
    #[serde(default)]
    pub source_connection: Option<SourceConnection>,
    #[serde(default = "default_schema")]
    pub source_schema: String,
    pub source_table: String,
    pub destination_table: String,
    pub mappings: Vec<FieldMapping>,
    #[serde(default = "default_create_table")]
    pub create_table: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_created_by")]
    pub created_by: String,
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_create_table() -> bool {
    true
}

fn default_batch_size() -> usize {
    10_000
}

fn default_created_by() -> String {
    "system".to_string()
}
