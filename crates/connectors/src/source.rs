use crate::error::SourceError;
use async_trait::async_trait;
use model::{migration::request::SourceConnection, records::row::RowData, schema::table::TableSchema};
use std::sync::Arc;

/// Read side of the pipeline. Implementations own their session resources
/// and must release them on every exit path.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Fetches column metadata plus a point-in-time row-count snapshot.
    async fn describe_table(&self, table: &str, schema: &str) -> Result<TableSchema, SourceError>;

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, SourceError>;

    /// Fetches one page of rows under an explicit column projection.
    async fn fetch_page(
        &self,
        table: &str,
        schema: &str,
        columns: &[String],
        offset: u64,
        limit: usize,
    ) -> Result<Vec<RowData>, SourceError>;
}

/// Resolves the provider for one migration: either the default configured
/// source or a per-request explicit connection. Returns the provider together
/// with its credential-free endpoint descriptor for the ledger.
#[async_trait]
pub trait SourceFactory: Send + Sync {
    async fn resolve(
        &self,
        connection: Option<&SourceConnection>,
    ) -> Result<(Arc<dyn SourceProvider>, String), SourceError>;
}
