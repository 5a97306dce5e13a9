use crate::{error::DestinationError, sink::DestinationSink};
use ::clickhouse::{Client, sql::Identifier};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};
use tracing::{debug, info};

/// ClickHouse write side over the HTTP interface. All statement parameters
/// go through bind placeholders, never string interpolation.
#[derive(Clone)]
pub struct ClickHouseSink {
    client: Client,
}

impl ClickHouseSink {
    pub fn new(url: &str, user: &str, password: &str, database: &str) -> Self {
        let client = Client::default()
            .with_url(url)
            .with_user(user)
            .with_password(password)
            .with_database(database);
        ClickHouseSink { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Connectivity probe, used at startup so a bad destination fails fast.
    pub async fn ping(&self) -> Result<(), DestinationError> {
        self.client.query("SELECT 1").fetch_one::<u8>().await?;
        Ok(())
    }
}

#[async_trait]
impl DestinationSink for ClickHouseSink {
    async fn table_exists(&self, table: &str) -> Result<bool, DestinationError> {
        let exists = self
            .client
            .query("EXISTS TABLE ?")
            .bind(Identifier(table))
            .fetch_one::<u8>()
            .await?;
        Ok(exists == 1)
    }

    async fn execute_ddl(&self, ddl: &str) -> Result<(), DestinationError> {
        info!("Executing destination DDL");
        debug!(ddl);
        self.client.query(ddl).execute().await?;
        Ok(())
    }

    async fn bulk_insert(
        &self,
        table: &str,
        rows: &[RowData],
        columns: &[String],
    ) -> Result<u64, DestinationError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let column_list = columns.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let row_placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
        let values_list = vec![row_placeholders; rows.len()].join(", ");

        let sql = format!("INSERT INTO ? ({column_list}) VALUES {values_list}");

        let mut query = self.client.query(&sql).bind(Identifier(table));
        for column in columns {
            query = query.bind(Identifier(column));
        }
        for row in rows {
            for column in columns {
                let cell = row.get(column).unwrap_or(&Value::Null);
                query = query.bind(cell.to_json());
            }
        }

        query.execute().await?;
        debug!(table, rows = rows.len(), "Inserted batch");
        Ok(rows.len() as u64)
    }

    async fn run_query(&self, sql: &str) -> Result<Vec<serde_json::Value>, DestinationError> {
        let mut cursor = self.client.query(sql).fetch_bytes("JSONEachRow")?;

        let mut raw = Vec::new();
        while let Some(chunk) = cursor.next().await? {
            raw.extend_from_slice(&chunk);
        }

        let content = String::from_utf8_lossy(&raw);
        let mut rows = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(line)?);
        }
        Ok(rows)
    }
}
