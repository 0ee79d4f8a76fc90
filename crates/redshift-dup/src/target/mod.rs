//! Destination database operations.
//!
//! DDL runs over a pooled PostgreSQL-wire connection; sample rows go through
//! the ODBC inserter in [`odbc`].

pub mod ddl;
pub mod odbc;

pub use odbc::OdbcBulkInserter;

use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};
use tracing::debug;

use crate::config::ConnectionConfig;
use crate::core::{DestinationDatabase, SchemaReflector, Table};
use crate::error::{DupError, Result};
use crate::pool::{self, Side};
use crate::reflect::reflect_tables;

/// Pooled connection to the destination database.
pub struct PgDestination {
    pool: Pool,
}

impl PgDestination {
    /// Connect and verify the pool.
    pub async fn connect(config: &ConnectionConfig, max_conns: usize) -> Result<Self> {
        let pool = pool::connect(config, max_conns, Side::Destination).await?;
        Ok(Self { pool })
    }

    async fn client(&self, context: &str) -> Result<Object> {
        self.pool.get().await.map_err(|e| {
            DupError::pool(e, format!("getting destination connection for {}", context))
        })
    }
}

#[async_trait]
impl SchemaReflector for PgDestination {
    async fn reflect_schema(&self, schema: &str) -> Result<Vec<Table>> {
        let client = self.client("reflect_schema").await?;
        reflect_tables(&client, schema)
            .await
            .map_err(DupError::Destination)
    }
}

#[async_trait]
impl DestinationDatabase for PgDestination {
    async fn execute(&self, sql: &str) -> Result<()> {
        debug!("Executing: {}", sql);
        let client = self.client("execute").await?;
        client
            .batch_execute(sql)
            .await
            .map_err(DupError::Destination)
    }

    async fn execute_batch(&self, statements: &[String]) -> Result<()> {
        if statements.is_empty() {
            return Ok(());
        }

        let mut client = self.client("execute_batch").await?;
        let tx = client
            .transaction()
            .await
            .map_err(DupError::Destination)?;

        for sql in statements {
            debug!("Executing: {}", sql);
            tx.batch_execute(sql).await.map_err(DupError::Destination)?;
        }

        tx.commit().await.map_err(DupError::Destination)?;
        debug!("Committed {} statements", statements.len());
        Ok(())
    }
}
