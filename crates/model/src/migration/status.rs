use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Lifecycle of a migration run. `Pending` is representable for the ledger
/// but the orchestrator only ever creates runs as `Running`; `Completed` and
/// `Failed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl MigrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::Pending => "pending",
            MigrationStatus::Running => "running",
            MigrationStatus::Completed => "completed",
            MigrationStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationStatus::Completed | MigrationStatus::Failed)
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MigrationStatus::Pending),
            "running" => Ok(MigrationStatus::Running),
            "completed" => Ok(MigrationStatus::Completed),
            "failed" => Ok(MigrationStatus::Failed),
            other => Err(format!("Unknown migration status: {other}")),
        }
    }
}

/// Batch-granular progress counters. `processed_records` is monotonically
/// non-decreasing within a run; `percentage` is forced to exactly 100 when
/// the run completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MigrationProgress {
    pub total_records: u64,
    pub processed_records: u64,
    pub percentage: f64,
    #[serde(default)]
    pub current_batch: Option<u64>,
    #[serde(default)]
    pub total_batches: Option<u64>,
}

/// Live, process-local view of a run held by the status registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationStatusReport {
    pub id: String,
    pub status: MigrationStatus,
    pub progress: MigrationProgress,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl MigrationStatusReport {
    pub fn started(id: &str) -> Self {
        MigrationStatusReport {
            id: id.to_string(),
            status: MigrationStatus::Running,
            progress: MigrationProgress::default(),
            started_at: Utc::now(),
            completed_at: None,
            error_message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            MigrationStatus::Pending,
            MigrationStatus::Running,
            MigrationStatus::Completed,
            MigrationStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<MigrationStatus>(), Ok(status));
        }
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!MigrationStatus::Pending.is_terminal());
        assert!(!MigrationStatus::Running.is_terminal());
        assert!(MigrationStatus::Completed.is_terminal());
        assert!(MigrationStatus::Failed.is_terminal());
    }
}
