use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read env file {path}: {reason}")]
    EnvFile { path: String, reason: String },

    #[error("Invalid env file: {0}")]
    EnvFormat(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
