use thiserror::Error;

/// Errors from the source side of the pipeline.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Invalid Postgres connection URL: {0}")]
    InvalidUrl(String),

    #[error("Table {0} not found")]
    TableNotFound(String),

    #[error("Failed to decode column {column}: {reason}")]
    Decode { column: String, reason: String },
}

/// Errors from the destination side of the pipeline.
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("ClickHouse error: {0}")]
    ClickHouse(#[from] ::clickhouse::error::Error),

    #[error("Failed to decode query result: {0}")]
    ResultDecode(#[from] serde_json::Error),
}
