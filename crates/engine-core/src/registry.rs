use model::migration::status::{MigrationStatus, MigrationStatusReport};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::warn;

/// Process-local live view of every migration submitted since startup.
///
/// Entries are never evicted; a long-lived server accumulates one terminal
/// entry per run until restart. The ledger, not this map, is the durable
/// record.
#[derive(Clone, Default)]
pub struct MigrationStatusRegistry {
    inner: Arc<RwLock<HashMap<String, MigrationStatusReport>>>,
}

impl MigrationStatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, report: MigrationStatusReport) {
        self.inner.write().await.insert(report.id.clone(), report);
    }

    pub async fn get(&self, id: &str) -> Option<MigrationStatusReport> {
        self.inner.read().await.get(id).cloned()
    }

    /// Batch-granular progress update. Ignored once the run is terminal so a
    /// straggling update can never resurrect a finished migration.
    pub async fn update_progress(
        &self,
        id: &str,
        processed_records: u64,
        total_records: u64,
        current_batch: u64,
        total_batches: u64,
    ) {
        let mut entries = self.inner.write().await;
        let Some(report) = entries.get_mut(id) else {
            warn!(id, "Progress update for unregistered migration");
            return;
        };
        if report.status.is_terminal() {
            return;
        }

        let percentage = if total_records == 0 {
            100.0
        } else {
            let raw = processed_records as f64 / total_records as f64 * 100.0;
            (raw.min(100.0) * 100.0).round() / 100.0
        };

        report.progress.total_records = total_records;
        report.progress.processed_records = processed_records;
        report.progress.percentage = percentage;
        report.progress.current_batch = Some(current_batch);
        report.progress.total_batches = Some(total_batches);
    }

    pub async fn complete(&self, id: &str) {
        let mut entries = self.inner.write().await;
        if let Some(report) = entries.get_mut(id)
            && !report.status.is_terminal()
        {
            report.status = MigrationStatus::Completed;
            report.progress.percentage = 100.0;
            report.completed_at = Some(chrono::Utc::now());
        }
    }

    pub async fn fail(&self, id: &str, error: &str) {
        let mut entries = self.inner.write().await;
        if let Some(report) = entries.get_mut(id)
            && !report.status.is_terminal()
        {
            report.status = MigrationStatus::Failed;
            report.error_message = Some(error.to_string());
            report.completed_at = Some(chrono::Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "run-1";

    async fn registry_with_entry() -> MigrationStatusRegistry {
        let registry = MigrationStatusRegistry::new();
        registry.register(MigrationStatusReport::started(ID)).await;
        registry
    }

    #[tokio::test]
    async fn progress_rounds_to_two_decimals_and_caps_at_100() {
        let registry = registry_with_entry().await;

        registry.update_progress(ID, 1, 3, 1, 3).await;
        let report = registry.get(ID).await.unwrap();
        assert_eq!(report.progress.percentage, 33.33);

        // Stale row-count snapshot can make processed exceed the total
        registry.update_progress(ID, 7, 3, 3, 3).await;
        let report = registry.get(ID).await.unwrap();
        assert_eq!(report.progress.percentage, 100.0);
    }

    #[tokio::test]
    async fn completion_forces_percentage_to_100() {
        let registry = registry_with_entry().await;
        registry.update_progress(ID, 5, 6, 3, 3).await;
        registry.complete(ID).await;

        let report = registry.get(ID).await.unwrap();
        assert_eq!(report.status, MigrationStatus::Completed);
        assert_eq!(report.progress.percentage, 100.0);
        assert!(report.completed_at.is_some());
    }

    #[tokio::test]
    async fn terminal_entries_never_mutate_again() {
        let registry = registry_with_entry().await;
        registry.fail(ID, "boom").await;

        registry.update_progress(ID, 99, 100, 1, 1).await;
        registry.complete(ID).await;

        let report = registry.get(ID).await.unwrap();
        assert_eq!(report.status, MigrationStatus::Failed);
        assert_eq!(report.error_message.as_deref(), Some("boom"));
        assert_eq!(report.progress.processed_records, 0);
    }

    #[tokio::test]
    async fn unknown_id_reads_as_none() {
        let registry = MigrationStatusRegistry::new();
        assert!(registry.get("missing").await.is_none());
    }
}
