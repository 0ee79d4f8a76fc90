//! Redshift source database operations.

use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};
use tokio_postgres::SimpleQueryMessage;
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::core::identifier::qualify_pg;
use crate::core::{ExternalColumn, SampleRow, SchemaReflector, SourceDatabase, Table};
use crate::error::{DupError, Result};
use crate::pool::{self, Side};
use crate::reflect::reflect_tables;

const EXTERNAL_COLUMNS_QUERY: &str = r#"
    SELECT columnname::text, external_type::text
    FROM svv_external_columns
    WHERE schemaname = $1 AND tablename = $2
    ORDER BY columnnum
"#;

const EXTERNAL_TABLES_QUERY: &str = r#"
    SELECT tablename::text
    FROM svv_external_tables
    WHERE schemaname = $1
    ORDER BY tablename
"#;

/// Pooled connection to the source cluster.
pub struct RedshiftSource {
    pool: Pool,
}

impl RedshiftSource {
    /// Connect and verify the pool.
    pub async fn connect(config: &ConnectionConfig, max_conns: usize) -> Result<Self> {
        let pool = pool::connect(config, max_conns, Side::Source).await?;
        Ok(Self { pool })
    }

    async fn client(&self, context: &str) -> Result<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| DupError::pool(e, format!("getting source connection for {}", context)))
    }
}

#[async_trait]
impl SchemaReflector for RedshiftSource {
    async fn reflect_schema(&self, schema: &str) -> Result<Vec<Table>> {
        let client = self.client("reflect_schema").await?;
        reflect_tables(&client, schema).await.map_err(DupError::Source)
    }
}

#[async_trait]
impl SourceDatabase for RedshiftSource {
    async fn external_columns(&self, schema: &str, table: &str) -> Result<Vec<ExternalColumn>> {
        let client = self.client("external_columns").await?;
        let rows = client
            .query(EXTERNAL_COLUMNS_QUERY, &[&schema, &table])
            .await
            .map_err(DupError::Source)?;

        Ok(rows
            .iter()
            .map(|row| ExternalColumn::new(row.get::<_, String>(0), row.get::<_, String>(1)))
            .collect())
    }

    async fn external_tables(&self, schema: &str) -> Result<Vec<String>> {
        let client = self.client("external_tables").await?;
        let rows = client
            .query(EXTERNAL_TABLES_QUERY, &[&schema])
            .await
            .map_err(DupError::Source)?;

        Ok(rows.iter().map(|row| row.get::<_, String>(0)).collect())
    }

    async fn sample_rows(&self, schema: &str, table: &str, limit: usize) -> Result<Vec<SampleRow>> {
        let sql = sample_sql(schema, table, limit)?;
        debug!("Sampling: {}", sql);

        let client = self.client("sample_rows").await?;
        let messages = client.simple_query(&sql).await.map_err(DupError::Source)?;

        let mut rows: Vec<SampleRow> = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                rows.push((0..row.len()).map(|i| row.get(i).map(str::to_string)).collect());
            }
        }
        Ok(rows)
    }
}

/// `SELECT *` with a row limit and no ordering.
fn sample_sql(schema: &str, table: &str, limit: usize) -> Result<String> {
    Ok(format!("SELECT * FROM {} LIMIT {}", qualify_pg(schema, table)?, limit))
}
