pub mod clickhouse;

use async_trait::async_trait;
use model::migration::{record::MigrationRecord, status::MigrationStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Ledger query failed: {0}")]
    ClickHouse(#[from] ::clickhouse::error::Error),

    #[error("Malformed ledger row: {0}")]
    Malformed(String),
}

/// Durable run ledger. One row per migration attempt, written exactly twice:
/// appended at submission and updated once at the terminal transition.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: &MigrationRecord) -> Result<(), HistoryError>;

    async fn update(
        &self,
        id: &str,
        status: MigrationStatus,
        records_migrated: u64,
        duration_seconds: u32,
        error_message: Option<&str>,
    ) -> Result<(), HistoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<MigrationRecord>, HistoryError>;

    /// Most-recent-first page of ledger rows plus the filtered total count.
    async fn list(
        &self,
        limit: u64,
        offset: u64,
        status: Option<MigrationStatus>,
    ) -> Result<(u64, Vec<MigrationRecord>), HistoryError>;
}
