//! Core traits at the database seams.
//!
//! - [`SchemaReflector`]: Lists the tables of a schema with their columns
//! - [`SourceDatabase`]: Reflection plus external-table catalog access and sampling
//! - [`DestinationDatabase`]: Reflection plus DDL execution
//! - [`BulkInsert`]: Batched parameter-marker inserts with bind overrides
//!
//! The components in [`crate::duplicate`] and [`crate::populate`] only talk to
//! databases through these traits, so they can be driven by in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::insert::{BindOverride, InsertStatement};
use super::schema::Table;

/// One sampled row: values in column order as text, `None` for SQL NULL.
pub type SampleRow = Vec<Option<String>>;

/// Column of an external (Spectrum) table as listed by `SVV_EXTERNAL_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalColumn {
    /// Column name.
    pub name: String,
    /// External type exactly as the catalog reports it (e.g. `varchar(150)`).
    pub external_type: String,
}

impl ExternalColumn {
    pub fn new(name: impl Into<String>, external_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external_type: external_type.into(),
        }
    }
}

/// How table definitions are obtained from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionStrategy {
    /// Structural reflection through the catalog (native tables).
    #[default]
    Native,
    /// `SVV_EXTERNAL_*` catalog views (external/federated tables).
    External,
}

/// Which engine supplies the column definitions used for bind overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSide {
    Source,
    /// The tables were created from the source, so the destination holds
    /// the same definitions and also covers external tables.
    #[default]
    Destination,
}

/// Reflect the table definitions of a schema.
#[async_trait]
pub trait SchemaReflector: Send + Sync {
    /// List every base table of `schema` with columns in ordinal order.
    async fn reflect_schema(&self, schema: &str) -> Result<Vec<Table>>;
}

/// Source database operations.
#[async_trait]
pub trait SourceDatabase: SchemaReflector {
    /// List `(column, external_type)` pairs of an external table.
    async fn external_columns(&self, schema: &str, table: &str) -> Result<Vec<ExternalColumn>>;

    /// List the external table names of a schema.
    async fn external_tables(&self, schema: &str) -> Result<Vec<String>>;

    /// Fetch at most `limit` rows of a table, in the server's default order.
    async fn sample_rows(&self, schema: &str, table: &str, limit: usize)
        -> Result<Vec<SampleRow>>;
}

/// Destination database operations.
#[async_trait]
pub trait DestinationDatabase: SchemaReflector {
    /// Execute one statement.
    async fn execute(&self, sql: &str) -> Result<()>;

    /// Execute several statements in one transaction.
    async fn execute_batch(&self, statements: &[String]) -> Result<()>;
}

/// Batched insert connection.
///
/// Implementations hold one connection for their whole lifetime; nothing is
/// committed until [`BulkInsert::commit`] is called.
pub trait BulkInsert {
    /// Resolve unqualified table names against `schema` from now on.
    fn use_schema(&mut self, schema: &str) -> Result<()>;

    /// Execute `statement` once per row, binding each column with its
    /// override or the driver default when the override is `None`.
    ///
    /// Returns the number of rows sent.
    fn execute_many(
        &mut self,
        statement: &InsertStatement,
        overrides: &[Option<BindOverride>],
        rows: &[SampleRow],
    ) -> Result<u64>;

    /// Commit everything executed since the last commit.
    fn commit(&mut self) -> Result<()>;

    /// Discard everything executed since the last commit.
    fn rollback(&mut self) -> Result<()>;
}
