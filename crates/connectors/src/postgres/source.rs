use crate::{error::SourceError, postgres::decode::decode_row, source::SourceProvider};
use async_trait::async_trait;
use model::{
    records::row::RowData,
    schema::{column::ColumnDefinition, table::TableSchema},
};
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, error};

const QUERY_TABLE_COLUMNS_SQL: &str = include_str!("sql/table_columns.sql");
const QUERY_TABLE_LIST_SQL: &str = include_str!("sql/table_list.sql");
const QUERY_TABLE_SIZE_SQL: &str = include_str!("sql/table_size.sql");

/// Postgres implementation of the read side, one connection per instance.
pub struct PgSource {
    client: Client,
}

impl PgSource {
    pub async fn connect(url: &str) -> Result<Self, SourceError> {
        let config = url
            .parse::<Config>()
            .map_err(|e| SourceError::InvalidUrl(e.to_string()))?;
        let (client, connection) = config.connect(NoTls).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!(%err, "Postgres connection error");
            }
        });
        Ok(PgSource { client })
    }
}

#[async_trait]
impl SourceProvider for PgSource {
    async fn describe_table(&self, table: &str, schema: &str) -> Result<TableSchema, SourceError> {
        let rows = self
            .client
            .query(QUERY_TABLE_COLUMNS_SQL, &[&schema, &table])
            .await?;

        if rows.is_empty() {
            return Err(SourceError::TableNotFound(format!("{schema}.{table}")));
        }

        let columns = rows
            .iter()
            .map(|row| ColumnDefinition {
                name: row.get("column_name"),
                data_type: row.get("data_type"),
                nullable: row.get::<_, String>("is_nullable") == "YES",
                primary_key: row.get("is_primary_key"),
                default_value: row.get("column_default"),
                max_length: row.get("character_maximum_length"),
            })
            .collect();

        let count_sql = format!(
            "SELECT COUNT(*) FROM {}.{}",
            quote_ident(schema),
            quote_ident(table)
        );
        let row_count: i64 = self.client.query_one(&count_sql, &[]).await?.get(0);

        let size_mb: f64 = self
            .client
            .query_one(QUERY_TABLE_SIZE_SQL, &[&schema, &table])
            .await?
            .get("size_mb");

        Ok(TableSchema {
            table: table.to_string(),
            schema_name: schema.to_string(),
            columns,
            row_count: Some(row_count.max(0) as u64),
            estimated_size_mb: Some(size_mb),
        })
    }

    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, SourceError> {
        let rows = self.client.query(QUERY_TABLE_LIST_SQL, &[&schema]).await?;
        Ok(rows.iter().map(|row| row.get("table_name")).collect())
    }

    async fn fetch_page(
        &self,
        table: &str,
        schema: &str,
        columns: &[String],
        offset: u64,
        limit: usize,
    ) -> Result<Vec<RowData>, SourceError> {
        let projection = columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "SELECT {projection} FROM {}.{} OFFSET $1 LIMIT $2",
            quote_ident(schema),
            quote_ident(table)
        );

        debug!(table, offset, limit, "Fetching source page");
        let rows = self
            .client
            .query(&sql, &[&(offset as i64), &(limit as i64)])
            .await?;

        rows.iter().map(decode_row).collect()
    }
}

/// Double-quotes an identifier for interpolation into catalog statements
/// where Postgres does not accept bind parameters.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_double_quoted() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
