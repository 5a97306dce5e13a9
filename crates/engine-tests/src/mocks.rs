//! In-memory collaborators for driving the orchestrator without databases.

use async_trait::async_trait;
use connectors::{
    error::{DestinationError, SourceError},
    sink::DestinationSink,
    source::{SourceFactory, SourceProvider},
};
use engine_core::history::{HistoryError, HistoryStore};
use model::{
    migration::{record::MigrationRecord, request::SourceConnection, status::MigrationStatus},
    records::row::RowData,
    schema::table::TableSchema,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::Semaphore;

pub struct MemSource {
    pub schema: TableSchema,
    pub rows: Vec<RowData>,
}

impl MemSource {
    pub fn new(schema: TableSchema, rows: Vec<RowData>) -> Self {
        MemSource { schema, rows }
    }
}

#[async_trait]
impl SourceProvider for MemSource {
    async fn describe_table(&self, table: &str, schema: &str) -> Result<TableSchema, SourceError> {
        if table != self.schema.table {
            return Err(SourceError::TableNotFound(format!("{schema}.{table}")));
        }
        let mut described = self.schema.clone();
        described.row_count = Some(self.rows.len() as u64);
        Ok(described)
    }

    async fn list_tables(&self, _schema: &str) -> Result<Vec<String>, SourceError> {
        Ok(vec![self.schema.table.clone()])
    }

    async fn fetch_page(
        &self,
        _table: &str,
        _schema: &str,
        columns: &[String],
        offset: u64,
        limit: usize,
    ) -> Result<Vec<RowData>, SourceError> {
        let start = (offset as usize).min(self.rows.len());
        let end = (start + limit).min(self.rows.len());
        let page = self.rows[start..end]
            .iter()
            .map(|row| {
                RowData::new(
                    columns
                        .iter()
                        .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                        .collect(),
                )
            })
            .collect();
        Ok(page)
    }
}

pub struct MemFactory {
    source: Arc<MemSource>,
}

impl MemFactory {
    pub fn new(source: Arc<MemSource>) -> Self {
        MemFactory { source }
    }
}

#[async_trait]
impl SourceFactory for MemFactory {
    async fn resolve(
        &self,
        _connection: Option<&SourceConnection>,
    ) -> Result<(Arc<dyn SourceProvider>, String), SourceError> {
        Ok((
            Arc::clone(&self.source) as Arc<dyn SourceProvider>,
            "mem://source".to_string(),
        ))
    }
}

/// Destination sink over a HashMap. Inserts can be gated on a semaphore to
/// hold a run mid-flight, or made to fail on a chosen batch number.
#[derive(Default)]
pub struct MemSink {
    pub tables: Mutex<HashMap<String, Vec<RowData>>>,
    pub ddl_log: Mutex<Vec<String>>,
    inserts_seen: AtomicUsize,
    fail_on_batch: Option<usize>,
    gate: Option<Arc<Semaphore>>,
}

impl MemSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the Nth bulk insert (1-based) with an injected error.
    pub fn failing_on_batch(batch: usize) -> Self {
        MemSink {
            fail_on_batch: Some(batch),
            ..Self::default()
        }
    }

    /// Each bulk insert consumes one permit, so the test controls pacing.
    pub fn gated(gate: Arc<Semaphore>) -> Self {
        MemSink {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DestinationSink for MemSink {
    async fn table_exists(&self, table: &str) -> Result<bool, DestinationError> {
        Ok(self.tables.lock().unwrap().contains_key(table))
    }

    async fn execute_ddl(&self, ddl: &str) -> Result<(), DestinationError> {
        self.ddl_log.lock().unwrap().push(ddl.to_string());
        let table = ddl
            .split_whitespace()
            .nth(5)
            .unwrap_or("unnamed")
            .to_string();
        self.tables.lock().unwrap().entry(table).or_default();
        Ok(())
    }

    async fn bulk_insert(
        &self,
        table: &str,
        rows: &[RowData],
        _columns: &[String],
    ) -> Result<u64, DestinationError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let batch = self.inserts_seen.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_batch == Some(batch) {
            return Err(DestinationError::ClickHouse(
                clickhouse::error::Error::Custom("injected insert failure".to_string()),
            ));
        }

        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend_from_slice(rows);
        Ok(rows.len() as u64)
    }

    async fn run_query(&self, _sql: &str) -> Result<Vec<serde_json::Value>, DestinationError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct MemHistory {
    pub records: Mutex<Vec<MigrationRecord>>,
}

impl MemHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: &str) -> Option<MigrationRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl HistoryStore for MemHistory {
    async fn append(&self, record: &MigrationRecord) -> Result<(), HistoryError> {
        self.records.lock().unwrap().push(record.clone());
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
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| HistoryError::Malformed(format!("no ledger row for {id}")))?;
        record.status = status;
        record.records_migrated = records_migrated;
        record.duration_seconds = duration_seconds;
        record.error_message = error_message.map(str::to_string);
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<MigrationRecord>, HistoryError> {
        Ok(self.record(id))
    }

    async fn list(
        &self,
        limit: u64,
        offset: u64,
        status: Option<MigrationStatus>,
    ) -> Result<(u64, Vec<MigrationRecord>), HistoryError> {
        let records = self.records.lock().unwrap();
        let mut matching: Vec<MigrationRecord> = records
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.migration_time.cmp(&a.migration_time));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((total, page))
    }
}
