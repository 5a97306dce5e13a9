use connectors::error::{DestinationError, SourceError};
use engine_config::ConfigError;
use engine_core::error::MigrationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source connection error: {0}")]
    Source(#[from] SourceError),

    #[error("Destination connection error: {0}")]
    Destination(#[from] DestinationError),

    #[error("Ledger error: {0}")]
    History(#[from] engine_core::history::HistoryError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid status filter '{0}' (expected pending, running, completed or failed)")]
    InvalidStatusFilter(String),

    #[error("Migration {id} failed: {reason}")]
    MigrationFailed { id: String, reason: String },
}
