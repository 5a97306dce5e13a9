use crate::{env::EnvManager, error::ConfigError};
use serde::Serialize;

/// Default Postgres source connection.
#[derive(Debug, Clone, Serialize)]
pub struct PgSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl PgSettings {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }

    /// Credential-free descriptor for logs and the ledger.
    pub fn endpoint(&self) -> String {
        format!("postgres://{}:{}/{}", self.host, self.port, self.database)
    }
}

/// ClickHouse destination, reached over the HTTP interface.
#[derive(Debug, Clone, Serialize)]
pub struct ChSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl ChSettings {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub postgres: PgSettings,
    pub clickhouse: ChSettings,
}

impl Settings {
    /// Reads both endpoints from `ROWFERRY_PG_*` / `ROWFERRY_CH_*` variables,
    /// falling back to local defaults for anything unset.
    pub fn from_env(env: &EnvManager) -> Result<Self, ConfigError> {
        Ok(Settings {
            postgres: PgSettings {
                host: var_or(env, "ROWFERRY_PG_HOST", "localhost"),
                port: port_or(env, "ROWFERRY_PG_PORT", 5432)?,
                database: var_or(env, "ROWFERRY_PG_DATABASE", "postgres"),
                user: var_or(env, "ROWFERRY_PG_USER", "postgres"),
                password: var_or(env, "ROWFERRY_PG_PASSWORD", ""),
            },
            clickhouse: ChSettings {
                host: var_or(env, "ROWFERRY_CH_HOST", "localhost"),
                port: port_or(env, "ROWFERRY_CH_PORT", 8123)?,
                database: var_or(env, "ROWFERRY_CH_DATABASE", "default"),
                user: var_or(env, "ROWFERRY_CH_USER", "default"),
                password: var_or(env, "ROWFERRY_CH_PASSWORD", ""),
            },
        })
    }
}

fn var_or(env: &EnvManager, key: &str, default: &str) -> String {
    env.get(key)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn port_or(env: &EnvManager, key: &str, default: u16) -> Result<u16, ConfigError> {
    match env.get(key).filter(|v| !v.is_empty()) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::from_env(&EnvManager::empty()).unwrap();
        assert_eq!(settings.postgres.url(), "postgres://postgres:@localhost:5432/postgres");
        assert_eq!(settings.clickhouse.url(), "http://localhost:8123");
        assert_eq!(settings.clickhouse.database, "default");
    }

    #[test]
    fn env_values_override_defaults() {
        let mut env = EnvManager::empty();
        env.load_from_str(
            "ROWFERRY_PG_HOST=db.internal\nROWFERRY_PG_PORT=5433\nROWFERRY_CH_DATABASE=analytics\n",
        )
        .unwrap();
        let settings = Settings::from_env(&env).unwrap();
        assert_eq!(settings.postgres.host, "db.internal");
        assert_eq!(settings.postgres.port, 5433);
        assert_eq!(settings.clickhouse.database, "analytics");
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut env = EnvManager::empty();
        env.load_from_str("ROWFERRY_PG_PORT=not-a-port\n").unwrap();
        assert!(matches!(
            Settings::from_env(&env),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn endpoint_omits_credentials() {
        let mut env = EnvManager::empty();
        env.load_from_str("ROWFERRY_PG_PASSWORD=hunter2\n").unwrap();
        let settings = Settings::from_env(&env).unwrap();
        assert_eq!(
            settings.postgres.endpoint(),
            "postgres://localhost:5432/postgres"
        );
        assert!(!settings.postgres.endpoint().contains("hunter2"));
    }
}
