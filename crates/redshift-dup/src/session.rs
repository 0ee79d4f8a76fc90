//! Connected source/destination pair driving the two components.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::core::ReflectionStrategy;
use crate::duplicate::SchemaDuplicator;
use crate::error::Result;
use crate::populate::{PopulateSummary, SampleDataPopulator, TableSample};
use crate::source::RedshiftSource;
use crate::target::{OdbcBulkInserter, PgDestination};

/// What was done to one schema.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
    pub schema: String,
    /// Tables created, `None` when creation was not requested.
    pub tables_created: Option<usize>,
    /// Rows populated, `None` when population was not requested.
    pub population: Option<PopulateSummary>,
}

impl SchemaReport {
    fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            tables_created: None,
            population: None,
        }
    }
}

/// Result of [`health_check`].
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub source_connected: bool,
    pub source_latency_ms: u64,
    pub source_error: Option<String>,
    pub destination_connected: bool,
    pub destination_latency_ms: u64,
    pub destination_error: Option<String>,
    pub odbc_connected: bool,
    pub odbc_error: Option<String>,
    pub healthy: bool,
}

/// Pools to both databases plus the loaded configuration.
pub struct Session {
    config: Config,
    source: Arc<RedshiftSource>,
    destination: Arc<PgDestination>,
}

impl Session {
    /// Connect to the source and the destination.
    pub async fn connect(config: Config) -> Result<Self> {
        let max = config.copy.max_connections;
        let source = RedshiftSource::connect(&config.source, max).await?;
        let destination = PgDestination::connect(&config.destination.connection, max).await?;
        Ok(Self {
            config,
            source: Arc::new(source),
            destination: Arc::new(destination),
        })
    }

    pub fn duplicator(&self, strategy: ReflectionStrategy) -> SchemaDuplicator {
        SchemaDuplicator::new(self.source.clone(), self.destination.clone(), strategy)
    }

    /// Build a populator; opens the ODBC connection.
    pub fn populator(&self) -> Result<SampleDataPopulator> {
        let inserter = OdbcBulkInserter::connect(&self.config.destination)?;
        Ok(SampleDataPopulator::new(
            self.source.clone(),
            self.destination.clone(),
            Box::new(inserter),
            self.config.copy.metadata_from,
        ))
    }

    /// Create each schema, or only `table` in each schema when given.
    pub async fn create_schemas(
        &self,
        schemas: &[String],
        strategy: ReflectionStrategy,
        table: Option<&str>,
    ) -> Result<Vec<SchemaReport>> {
        let mut duplicator = self.duplicator(strategy);
        let mut reports = Vec::with_capacity(schemas.len());

        for schema in schemas {
            let mut report = SchemaReport::new(schema);
            let created = match (table, strategy) {
                (Some(t), ReflectionStrategy::Native) => {
                    duplicator.create_schema(schema).await?;
                    duplicator.create_table(schema, t).await?;
                    1
                }
                (Some(t), ReflectionStrategy::External) => {
                    duplicator.create_schema(schema).await?;
                    duplicator.create_external_table(schema, t).await?;
                    1
                }
                (None, _) => duplicator.create(schema).await?,
            };
            report.tables_created = Some(created);
            reports.push(report);
        }
        Ok(reports)
    }

    /// Populate each schema, or only `table` in each schema when given.
    pub async fn populate_schemas(
        &self,
        schemas: &[String],
        sample_size: usize,
        table: Option<&str>,
    ) -> Result<Vec<SchemaReport>> {
        let mut populator = self.populator()?;
        let mut reports = Vec::with_capacity(schemas.len());

        for schema in schemas {
            let mut report = SchemaReport::new(schema);
            let summary = match table {
                Some(t) => {
                    let started_at = Utc::now();
                    let rows = populator.populate_table(schema, t, sample_size).await?;
                    let completed_at = Utc::now();
                    PopulateSummary {
                        schema: schema.clone(),
                        tables: vec![TableSample {
                            table: t.to_string(),
                            rows,
                        }],
                        total_rows: rows,
                        started_at,
                        completed_at,
                        duration_seconds: (completed_at - started_at).num_milliseconds() as f64
                            / 1000.0,
                    }
                }
                None => populator.populate_all_tables(schema, sample_size).await?,
            };
            report.population = Some(summary);
            reports.push(report);
        }
        Ok(reports)
    }

    /// Create then populate each schema.
    pub async fn copy_schemas(
        &self,
        schemas: &[String],
        strategy: ReflectionStrategy,
        sample_size: usize,
    ) -> Result<Vec<SchemaReport>> {
        let created = self.create_schemas(schemas, strategy, None).await?;
        let populated = self.populate_schemas(schemas, sample_size, None).await?;

        let reports = created
            .into_iter()
            .zip(populated)
            .map(|(mut c, p)| {
                c.population = p.population;
                c
            })
            .collect::<Vec<_>>();
        info!("Copied {} schemas", reports.len());
        Ok(reports)
    }
}

/// Check the source, the destination and the ODBC connection independently.
pub async fn health_check(config: &Config) -> HealthCheckResult {
    let start = Instant::now();
    let source = RedshiftSource::connect(&config.source, 1).await;
    let source_latency_ms = start.elapsed().as_millis() as u64;

    let start = Instant::now();
    let destination = PgDestination::connect(&config.destination.connection, 1).await;
    let destination_latency_ms = start.elapsed().as_millis() as u64;

    let odbc = OdbcBulkInserter::connect(&config.destination).and_then(|i| i.ping());

    let healthy = source.is_ok() && destination.is_ok() && odbc.is_ok();
    HealthCheckResult {
        source_connected: source.is_ok(),
        source_latency_ms,
        source_error: source.err().map(|e| e.to_string()),
        destination_connected: destination.is_ok(),
        destination_latency_ms,
        destination_error: destination.err().map(|e| e.to_string()),
        odbc_connected: odbc.is_ok(),
        odbc_error: odbc.err().map(|e| e.to_string()),
        healthy,
    }
}
