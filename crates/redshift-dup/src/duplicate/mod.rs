//! Schema duplication from the source into the destination.
//!
//! Tables are re-created empty. Native tables come from catalog reflection
//! with server-side defaults and identity markers stripped; external tables
//! are rebuilt from the `(column, external_type)` pairs of the external
//! catalog, with types replayed verbatim.

use std::sync::Arc;

use tracing::{debug, info};

use crate::core::{
    DestinationDatabase, ExternalColumn, ReflectionStrategy, SchemaCache, SourceDatabase,
};
use crate::error::Result;
use crate::target::ddl::{create_external_table_sql, create_schema_sql, create_table_sql};

/// Copies table definitions of one schema at a time.
pub struct SchemaDuplicator {
    source: Arc<dyn SourceDatabase>,
    destination: Arc<dyn DestinationDatabase>,
    strategy: ReflectionStrategy,
    cache: SchemaCache,
}

impl SchemaDuplicator {
    pub fn new(
        source: Arc<dyn SourceDatabase>,
        destination: Arc<dyn DestinationDatabase>,
        strategy: ReflectionStrategy,
    ) -> Self {
        Self {
            source,
            destination,
            strategy,
            cache: SchemaCache::new(),
        }
    }

    /// Reflect `schema` from the source unless it is already cached.
    pub async fn refresh_metadata(&mut self, schema: &str) -> Result<()> {
        self.cache
            .get_or_refresh(self.source.as_ref(), schema)
            .await?;
        Ok(())
    }

    /// Create `schema` in the destination if it does not exist.
    pub async fn create_schema(&self, schema: &str) -> Result<()> {
        info!("Creating schema {}.", schema);
        self.destination.execute(&create_schema_sql(schema)?).await
    }

    /// Drop default expressions and identity markers from a cached table.
    pub fn strip_defaults(&mut self, table: &str) -> Result<()> {
        let cached = self.cache.table_mut(table)?;
        if cached.has_defaults() {
            cached.strip_defaults();
            debug!("Stripped defaults from {}", table);
        }
        Ok(())
    }

    /// Create one table of `schema` in the destination.
    pub async fn create_table(&mut self, schema: &str, table: &str) -> Result<()> {
        self.refresh_metadata(schema).await?;
        self.strip_defaults(table)?;

        info!("Creating table {}.{}.", schema, table);
        let ddl = create_table_sql(self.cache.table(table)?)?;
        self.destination.execute(&ddl).await
    }

    /// Create every table of `schema` in one destination transaction.
    ///
    /// Tables are emitted in name order; a foreign key referencing a table
    /// that sorts later fails the batch.
    pub async fn create_all_tables(&mut self, schema: &str) -> Result<usize> {
        self.refresh_metadata(schema).await?;

        let names = self.cache.table_names();
        let mut statements = Vec::with_capacity(names.len());
        for name in &names {
            self.strip_defaults(name)?;
            statements.push(create_table_sql(self.cache.table(name)?)?);
        }

        info!("Creating {} tables in {}.", statements.len(), schema);
        self.destination.execute_batch(&statements).await?;
        Ok(statements.len())
    }

    /// Create the schema and all of its tables.
    pub async fn create_full_schema(&mut self, schema: &str) -> Result<usize> {
        self.refresh_metadata(schema).await?;
        self.create_schema(schema).await?;
        self.create_all_tables(schema).await
    }

    /// Column names and external types of an external table, in column order.
    pub async fn list_external_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ExternalColumn>> {
        self.source.external_columns(schema, table).await
    }

    /// Create an external table's counterpart in the destination.
    pub async fn create_external_table(&self, schema: &str, table: &str) -> Result<()> {
        let columns = self.list_external_columns(schema, table).await?;
        info!("Creating external table {}.{}.", schema, table);
        let ddl = create_external_table_sql(schema, table, &columns)?;
        self.destination.execute(&ddl).await
    }

    /// Create the schema and every external table it lists.
    pub async fn create_external_schema(&self, schema: &str) -> Result<usize> {
        self.create_schema(schema).await?;

        let tables = self.source.external_tables(schema).await?;
        for table in &tables {
            self.create_external_table(schema, table).await?;
        }
        info!("Created {} external tables in {}.", tables.len(), schema);
        Ok(tables.len())
    }

    /// Create `schema` with the configured strategy.
    pub async fn create(&mut self, schema: &str) -> Result<usize> {
        match self.strategy {
            ReflectionStrategy::Native => self.create_full_schema(schema).await,
            ReflectionStrategy::External => self.create_external_schema(schema).await,
        }
    }
}
