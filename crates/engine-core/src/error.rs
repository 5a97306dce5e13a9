use crate::history::HistoryError;
use connectors::error::{DestinationError, SourceError};
use planner::error::PlanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Destination error: {0}")]
    Destination(#[from] DestinationError),

    #[error("Planning error: {0}")]
    Planning(#[from] PlanError),

    #[error("Ledger error: {0}")]
    History(#[from] HistoryError),

    #[error("Failed to encode mapping plan: {0}")]
    Encode(#[from] serde_json::Error),
}
