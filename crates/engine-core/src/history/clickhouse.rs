use crate::history::{HistoryError, HistoryStore};
use ::clickhouse::{Client, Row};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::migration::{record::MigrationRecord, status::MigrationStatus};
use serde::{Deserialize, Serialize};
use tracing::info;

const LEDGER_DDL: &str = include_str!("sql/migration_history.sql");

/// Ledger rows live in the destination ClickHouse instance itself, in a
/// `migration_history` table partitioned by creation month.
#[derive(Clone)]
pub struct ClickHouseHistoryStore {
    client: Client,
}

/// Wire shape of one ledger row. Status travels as its string form and a
/// missing error message as the empty string, which keeps the table free of
/// Nullable columns.
#[derive(Debug, Row, Serialize, Deserialize)]
struct LedgerRow {
    id: String,
    source: String,
    destination: String,
    source_table: String,
    #[serde(with = "::clickhouse::serde::chrono::datetime")]
    migration_time: DateTime<Utc>,
    description: String,
    table_fields: Vec<String>,
    field_mappings: String,
    status: String,
    records_migrated: u64,
    error_message: String,
    duration_seconds: u32,
    created_by: String,
    metadata: String,
}

impl ClickHouseHistoryStore {
    pub fn new(client: Client) -> Self {
        ClickHouseHistoryStore { client }
    }

    /// Creates the ledger table when absent. Safe to call on every startup.
    pub async fn init(&self) -> Result<(), HistoryError> {
        self.client.query(LEDGER_DDL).execute().await?;
        info!("Migration ledger ready");
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for ClickHouseHistoryStore {
    async fn append(&self, record: &MigrationRecord) -> Result<(), HistoryError> {
        let mut insert = self.client.insert::<LedgerRow>("migration_history").await?;
        insert.write(&LedgerRow::from(record)).await?;
        insert.end().await?;
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        status: MigrationStatus,
        records_migrated: u64,
        duration_seconds: u32,
        error_message: Option<&str>,
    ) -> Result<(), HistoryError> {
        self.client
            .query(
                "ALTER TABLE migration_history \
                 UPDATE status = ?, records_migrated = ?, duration_seconds = ?, error_message = ? \
                 WHERE id = ? \
                 SETTINGS mutations_sync = 1",
            )
            .bind(status.as_str())
            .bind(records_migrated)
            .bind(duration_seconds)
            .bind(error_message.unwrap_or(""))
            .bind(id)
            .execute()
            .await?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<MigrationRecord>, HistoryError> {
        let row = self
            .client
            .query("SELECT ?fields FROM migration_history WHERE id = ?")
            .bind(id)
            .fetch_optional::<LedgerRow>()
            .await?;

        row.map(MigrationRecord::try_from).transpose()
    }

    async fn list(
        &self,
        limit: u64,
        offset: u64,
        status: Option<MigrationStatus>,
    ) -> Result<(u64, Vec<MigrationRecord>), HistoryError> {
        let (total, rows) = match status {
            Some(status) => {
                let total = self
                    .client
                    .query("SELECT count() FROM migration_history WHERE status = ?")
                    .bind(status.as_str())
                    .fetch_one::<u64>()
                    .await?;
                let rows = self
                    .client
                    .query(
                        "SELECT ?fields FROM migration_history WHERE status = ? \
                         ORDER BY migration_time DESC, id LIMIT ? OFFSET ?",
                    )
                    .bind(status.as_str())
                    .bind(limit)
                    .bind(offset)
                    .fetch_all::<LedgerRow>()
                    .await?;
                (total, rows)
            }
            None => {
                let total = self
                    .client
                    .query("SELECT count() FROM migration_history")
                    .fetch_one::<u64>()
                    .await?;
                let rows = self
                    .client
                    .query(
                        "SELECT ?fields FROM migration_history \
                         ORDER BY migration_time DESC, id LIMIT ? OFFSET ?",
                    )
                    .bind(limit)
                    .bind(offset)
                    .fetch_all::<LedgerRow>()
                    .await?;
                (total, rows)
            }
        };

        let records = rows
            .into_iter()
            .map(MigrationRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((total, records))
    }
}

impl From<&MigrationRecord> for LedgerRow {
    fn from(record: &MigrationRecord) -> Self {
        LedgerRow {
            id: record.id.clone(),
            source: record.source.clone(),
            destination: record.destination.clone(),
            source_table: record.source_table.clone(),
            migration_time: record.migration_time,
            description: record.description.clone(),
            table_fields: record.table_fields.clone(),
            field_mappings: record.field_mappings.clone(),
            status: record.status.as_str().to_string(),
            records_migrated: record.records_migrated,
            error_message: record.error_message.clone().unwrap_or_default(),
            duration_seconds: record.duration_seconds,
            created_by: record.created_by.clone(),
            metadata: record.metadata.clone(),
        }
    }
}

impl TryFrom<LedgerRow> for MigrationRecord {
    type Error = HistoryError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<MigrationStatus>()
            .map_err(HistoryError::Malformed)?;

        Ok(MigrationRecord {
            id: row.id,
            source: row.source,
            destination: row.destination,
            source_table: row.source_table,
            migration_time: row.migration_time,
            description: row.description,
            table_fields: row.table_fields,
            field_mappings: row.field_mappings,
            status,
            records_migrated: row.records_migrated,
            error_message: (!row.error_message.is_empty()).then_some(row.error_message),
            duration_seconds: row.duration_seconds,
            created_by: row.created_by,
            metadata: row.metadata,
        })
    }
}
