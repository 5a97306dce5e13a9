use crate::error::DestinationError;
use async_trait::async_trait;
use model::records::row::RowData;

/// Write side of the pipeline, also reused by the run ledger for ad hoc
/// reads.
#[async_trait]
pub trait DestinationSink: Send + Sync {
    async fn table_exists(&self, table: &str) -> Result<bool, DestinationError>;

    /// Executes a DDL statement. Statements are expected to carry their own
    /// create-if-not-exists semantics so retries stay idempotent.
    async fn execute_ddl(&self, ddl: &str) -> Result<(), DestinationError>;

    /// Inserts one transformed page under the destination projection and
    /// returns the inserted row count.
    async fn bulk_insert(
        &self,
        table: &str,
        rows: &[RowData],
        columns: &[String],
    ) -> Result<u64, DestinationError>;

    /// Runs a read query and returns its rows as JSON objects.
    async fn run_query(&self, sql: &str) -> Result<Vec<serde_json::Value>, DestinationError>;
}
