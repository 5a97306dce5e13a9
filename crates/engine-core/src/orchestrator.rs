use crate::{
    error::MigrationError,
    history::HistoryStore,
    registry::MigrationStatusRegistry,
    transform::transform_page,
};
use chrono::Utc;
use connectors::{
    sink::DestinationSink,
    source::{SourceFactory, SourceProvider},
};
use model::{
    mapping::FieldMapping,
    migration::{
        record::MigrationRecord,
        request::{MigrationRequest, SourceConnection},
        status::{MigrationStatus, MigrationStatusReport},
    },
    schema::table::TableSchema,
};
use planner::mapping::{MappingPlan, generate_ddl, generate_mappings, validate_mappings};
use std::{sync::Arc, time::Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Drives the migration pipeline. All collaborators are injected; the
/// orchestrator holds no global state and can be cloned into spawned tasks.
#[derive(Clone)]
pub struct MigrationOrchestrator {
    sources: Arc<dyn SourceFactory>,
    sink: Arc<dyn DestinationSink>,
    history: Arc<dyn HistoryStore>,
    registry: MigrationStatusRegistry,
}

impl MigrationOrchestrator {
    pub fn new(
        sources: Arc<dyn SourceFactory>,
        sink: Arc<dyn DestinationSink>,
        history: Arc<dyn HistoryStore>,
        registry: MigrationStatusRegistry,
    ) -> Self {
        MigrationOrchestrator {
            sources,
            sink,
            history,
            registry,
        }
    }

    /// Validates and books the run, then schedules the batch loop and returns
    /// the migration id without waiting for any data to move. The registry
    /// entry is written before the task spawns, so a caller polling the id it
    /// received always finds a registered run.
    pub async fn submit(&self, request: MigrationRequest) -> Result<String, MigrationError> {
        let mut violations = Vec::new();
        if request.batch_size == 0 {
            violations.push("Batch size must be greater than zero".to_string());
        }
        violations.extend(validate_mappings(&request.mappings));
        if !violations.is_empty() {
            return Err(MigrationError::Validation(violations));
        }

        let active: Vec<FieldMapping> = request
            .mappings
            .iter()
            .filter(|m| m.is_active())
            .cloned()
            .collect();
        let source_fields: Vec<String> =
            active.iter().map(|m| m.source_field.clone()).collect();
        let destination_fields: Vec<String> =
            active.iter().map(|m| m.destination_field.clone()).collect();

        let (source, endpoint) = self
            .sources
            .resolve(request.source_connection.as_ref())
            .await?;

        let id = Uuid::new_v4().to_string();
        let record = MigrationRecord {
            id: id.clone(),
            source: endpoint,
            destination: request.destination_table.clone(),
            source_table: request.source_table.clone(),
            migration_time: Utc::now(),
            description: request.description.clone(),
            table_fields: source_fields.clone(),
            field_mappings: serde_json::to_string(&active)?,
            status: MigrationStatus::Running,
            records_migrated: 0,
            error_message: None,
            duration_seconds: 0,
            created_by: request.created_by.clone(),
            metadata: "{}".to_string(),
        };
        self.history.append(&record).await?;
        self.registry.register(MigrationStatusReport::started(&id)).await;

        info!(
            id,
            table = request.source_table,
            destination = request.destination_table,
            "Migration submitted"
        );

        let orchestrator = self.clone();
        tokio::spawn(async move {
            orchestrator
                .run(&id, source, request, active, source_fields, destination_fields)
                .await;
        });

        Ok(record.id)
    }

    /// One full run, executed inside its own task. Never propagates an error:
    /// any failure terminates this run as FAILED on both the registry and the
    /// ledger, leaving already-loaded batches in place.
    async fn run(
        &self,
        id: &str,
        source: Arc<dyn SourceProvider>,
        request: MigrationRequest,
        active: Vec<FieldMapping>,
        source_fields: Vec<String>,
        destination_fields: Vec<String>,
    ) {
        let started = Instant::now();
        let mut migrated: u64 = 0;

        let outcome = self
            .run_batches(
                id,
                source.as_ref(),
                &request,
                &active,
                &source_fields,
                &destination_fields,
                &mut migrated,
            )
            .await;
        let duration_seconds = started.elapsed().as_secs() as u32;

        match outcome {
            Ok(()) => {
                info!(id, migrated, duration_seconds, "Migration completed");
                if let Err(err) = self
                    .history
                    .update(
                        id,
                        MigrationStatus::Completed,
                        migrated,
                        duration_seconds,
                        None,
                    )
                    .await
                {
                    error!(id, %err, "Failed to record completion in the ledger");
                }
                self.registry.complete(id).await;
            }
            Err(run_error) => {
                let message = run_error.to_string();
                warn!(id, migrated, error = %message, "Migration failed");
                if let Err(err) = self
                    .history
                    .update(
                        id,
                        MigrationStatus::Failed,
                        migrated,
                        duration_seconds,
                        Some(&message),
                    )
                    .await
                {
                    error!(id, %err, "Failed to record failure in the ledger");
                }
                self.registry.fail(id, &message).await;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_batches(
        &self,
        id: &str,
        source: &dyn SourceProvider,
        request: &MigrationRequest,
        active: &[FieldMapping],
        source_fields: &[String],
        destination_fields: &[String],
        migrated: &mut u64,
    ) -> Result<(), MigrationError> {
        if request.create_table {
            let ddl = generate_ddl(&request.destination_table, active, None, None)?;
            self.sink.execute_ddl(&ddl).await?;
        }

        // Point-in-time denominator: rows written to the source during the
        // run are not reflected, so the percentage runs against a stale
        // total and is capped rather than corrected.
        let schema = source
            .describe_table(&request.source_table, &request.source_schema)
            .await?;
        let total_records = schema.row_count.unwrap_or(0);
        let batch_size = request.batch_size as u64;
        let total_batches = if total_records == 0 {
            1
        } else {
            total_records.div_ceil(batch_size)
        };

        let mut batch_index: u64 = 0;
        loop {
            let page = source
                .fetch_page(
                    &request.source_table,
                    &request.source_schema,
                    source_fields,
                    batch_index * batch_size,
                    request.batch_size,
                )
                .await?;
            if page.is_empty() {
                break;
            }

            let rows = transform_page(&page, active);
            let inserted = self
                .sink
                .bulk_insert(&request.destination_table, &rows, destination_fields)
                .await?;
            *migrated += inserted;
            batch_index += 1;

            self.registry
                .update_progress(id, *migrated, total_records, batch_index, total_batches)
                .await;
        }

        Ok(())
    }

    /// Live status lookup. Ids submitted before a process restart resolve to
    /// NotFound here; the ledger remains the durable source of truth.
    pub async fn get_status(&self, id: &str) -> Result<MigrationStatusReport, MigrationError> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| MigrationError::NotFound(format!("Migration {id}")))
    }

    pub async fn list_source_tables(
        &self,
        schema: &str,
        connection: Option<&SourceConnection>,
    ) -> Result<Vec<String>, MigrationError> {
        let (source, _) = self.sources.resolve(connection).await?;
        Ok(source.list_tables(schema).await?)
    }

    pub async fn analyze_table(
        &self,
        table: &str,
        schema: &str,
        connection: Option<&SourceConnection>,
    ) -> Result<TableSchema, MigrationError> {
        let (source, _) = self.sources.resolve(connection).await?;
        Ok(source.describe_table(table, schema).await?)
    }

    /// Suggested mapping plan for a source table, including destination DDL
    /// and advisory type warnings.
    pub async fn suggest_mappings(
        &self,
        table: &str,
        schema: &str,
        destination_table: &str,
        connection: Option<&SourceConnection>,
    ) -> Result<MappingPlan, MigrationError> {
        let (source, _) = self.sources.resolve(connection).await?;
        let table_schema = source.describe_table(table, schema).await?;
        Ok(generate_mappings(&table_schema, destination_table)?)
    }

    pub async fn history(
        &self,
        limit: u64,
        offset: u64,
        status: Option<MigrationStatus>,
    ) -> Result<(u64, Vec<MigrationRecord>), MigrationError> {
        Ok(self.history.list(limit, offset, status).await?)
    }

    pub async fn history_record(&self, id: &str) -> Result<MigrationRecord, MigrationError> {
        self.history
            .get_by_id(id)
            .await?
            .ok_or_else(|| MigrationError::NotFound(format!("Migration {id}")))
    }
}
