use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("No active mappings to generate DDL")]
    NoActiveMappings,
}
