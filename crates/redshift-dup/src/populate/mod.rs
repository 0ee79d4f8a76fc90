//! Sample data population.
//!
//! Rows are sampled from the source with a plain `SELECT … LIMIT n` and
//! written to the destination through the bulk inserter, one commit per
//! table. Character columns declared with a length of
//! [`WIDE_CHAR_THRESHOLD`] or more are bound as wide text so the driver does
//! not truncate them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::core::insert::WIDE_CHAR_THRESHOLD;
use crate::core::{
    BindOverride, BulkInsert, ColumnType, DestinationDatabase, InsertStatement, MetadataSide,
    SampleRow, SchemaCache, SourceDatabase,
};
use crate::error::{DupError, Result};

/// Bind override for a column type: wide text for long character columns.
pub fn override_for(ty: &ColumnType) -> Option<BindOverride> {
    match ty.char_length() {
        Some(n) if n >= WIDE_CHAR_THRESHOLD => Some(BindOverride::wide_char()),
        _ => None,
    }
}

/// Rows inserted into one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSample {
    pub table: String,
    pub rows: u64,
}

/// Outcome of [`SampleDataPopulator::populate_all_tables`].
#[derive(Debug, Clone, Serialize)]
pub struct PopulateSummary {
    pub schema: String,
    pub tables: Vec<TableSample>,
    pub total_rows: u64,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,
}

impl PopulateSummary {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Copies a sample of rows per table into already-created destination tables.
pub struct SampleDataPopulator {
    source: Arc<dyn SourceDatabase>,
    destination: Arc<dyn DestinationDatabase>,
    inserter: Box<dyn BulkInsert>,
    metadata_from: MetadataSide,
    cache: SchemaCache,
}

impl SampleDataPopulator {
    pub fn new(
        source: Arc<dyn SourceDatabase>,
        destination: Arc<dyn DestinationDatabase>,
        inserter: Box<dyn BulkInsert>,
        metadata_from: MetadataSide,
    ) -> Self {
        Self {
            source,
            destination,
            inserter,
            metadata_from,
            cache: SchemaCache::new(),
        }
    }

    /// Reflect `schema` from the metadata side unless it is already cached.
    pub async fn refresh_metadata(&mut self, schema: &str) -> Result<()> {
        match self.metadata_from {
            MetadataSide::Source => {
                self.cache
                    .get_or_refresh(self.source.as_ref(), schema)
                    .await?;
            }
            MetadataSide::Destination => {
                self.cache
                    .get_or_refresh(self.destination.as_ref(), schema)
                    .await?;
            }
        }
        Ok(())
    }

    /// Fetch up to `n` rows of a source table.
    pub async fn sample_rows(&self, schema: &str, table: &str, n: usize) -> Result<Vec<SampleRow>> {
        self.source.sample_rows(schema, table, n).await
    }

    /// Insert statement with one marker per value of the first row.
    pub fn build_insert_statement(&self, table: &str, rows: &[SampleRow]) -> Result<InsertStatement> {
        let first = rows
            .first()
            .ok_or_else(|| DupError::EmptySample(table.to_string()))?;
        InsertStatement::new(table, first.len())
    }

    /// Per-column bind overrides of a cached table, in column order.
    pub fn build_type_overrides(&self, table: &str) -> Result<Vec<Option<BindOverride>>> {
        Ok(self
            .cache
            .table(table)?
            .columns
            .iter()
            .map(|c| override_for(&c.data_type))
            .collect())
    }

    /// Copy up to `n` sampled rows of one table and commit them.
    pub async fn populate_table(&mut self, schema: &str, table: &str, n: usize) -> Result<u64> {
        self.refresh_metadata(schema).await?;

        let rows = self.sample_rows(schema, table, n).await?;
        if rows.is_empty() {
            info!("No rows sampled from {}.{}, skipping.", schema, table);
            return Ok(0);
        }

        let statement = self.build_insert_statement(table, &rows)?;
        let mut overrides = self.build_type_overrides(table)?;
        if overrides.len() != statement.placeholders {
            warn!(
                "{}.{}: {} cached columns but {} sampled values; unmatched columns use default binding",
                schema,
                table,
                overrides.len(),
                statement.placeholders
            );
            overrides.resize(statement.placeholders, None);
        }

        info!("Populating table {}.{} with {} rows.", schema, table, rows.len());
        let with_table = |e: DupError| match e {
            DupError::Odbc(err) => DupError::bulk_insert(table, err.to_string()),
            other => other,
        };
        self.inserter.use_schema(schema)?;
        let result = self
            .inserter
            .execute_many(&statement, &overrides, &rows)
            .and_then(|n| self.inserter.commit().map(|()| n));
        let inserted = match result {
            Ok(n) => n,
            Err(e) => {
                if let Err(rollback_err) = self.inserter.rollback() {
                    warn!(
                        "Rollback after failed insert into {}.{} failed: {}",
                        schema, table, rollback_err
                    );
                }
                return Err(with_table(e));
            }
        };

        info!("Inserted {} rows into {}.{}.", inserted, schema, table);
        Ok(inserted)
    }

    /// Populate every table of `schema`, committing each one separately.
    pub async fn populate_all_tables(&mut self, schema: &str, n: usize) -> Result<PopulateSummary> {
        let started_at = Utc::now();
        self.refresh_metadata(schema).await?;

        let mut tables = Vec::new();
        for table in self.cache.table_names() {
            let rows = self.populate_table(schema, &table, n).await?;
            tables.push(TableSample { table, rows });
        }

        let completed_at = Utc::now();
        let total_rows: u64 = tables.iter().map(|t| t.rows).sum();
        info!(
            "Populated {} tables in {} with {} rows.",
            tables.len(),
            schema,
            total_rows
        );

        Ok(PopulateSummary {
            schema: schema.to_string(),
            tables,
            total_rows,
            started_at,
            completed_at,
            duration_seconds: (completed_at - started_at).num_milliseconds() as f64 / 1000.0,
        })
    }
}
