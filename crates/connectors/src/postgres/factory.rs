use crate::{
    error::SourceError,
    postgres::source::PgSource,
    source::{SourceFactory, SourceProvider},
};
use async_trait::async_trait;
use model::migration::request::SourceConnection;
use std::sync::Arc;
use tracing::info;

/// Hands out source connections per migration request. Requests without an
/// explicit source share the pre-established default connection; requests
/// carrying their own connection parameters get a fresh one.
pub struct PgSourceFactory {
    default: Arc<PgSource>,
    default_endpoint: String,
}

impl PgSourceFactory {
    pub async fn connect(url: &str, endpoint: &str) -> Result<Self, SourceError> {
        let default = Arc::new(PgSource::connect(url).await?);
        Ok(PgSourceFactory {
            default,
            default_endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl SourceFactory for PgSourceFactory {
    async fn resolve(
        &self,
        connection: Option<&SourceConnection>,
    ) -> Result<(Arc<dyn SourceProvider>, String), SourceError> {
        match connection {
            Some(conn) => {
                let url = format!(
                    "postgres://{}:{}@{}:{}/{}",
                    conn.user, conn.password, conn.host, conn.port, conn.database
                );
                info!(endpoint = %conn.endpoint(), "Connecting to request-scoped source");
                let source = PgSource::connect(&url).await?;
                Ok((Arc::new(source), conn.endpoint()))
            }
            None => Ok((
                Arc::clone(&self.default) as Arc<dyn SourceProvider>,
                self.default_endpoint.clone(),
            )),
        }
    }
}
