//! # redshift-dup
//!
//! Duplicate Redshift schemas, and a sample of their rows, into another
//! database.
//!
//! - **Schema duplication** through catalog reflection for native tables, or
//!   through the `SVV_EXTERNAL_*` views for external (Spectrum) tables
//! - **Sample population** with `SELECT … LIMIT n` on the source and a
//!   batched ODBC insert on the destination, binding long character columns
//!   as wide text
//! - **Schema-scoped metadata cache** that reflects again only when the
//!   requested schema changes
//!
//! ## Example
//!
//! ```rust,no_run
//! use redshift_dup::{Config, ReflectionStrategy, Session};
//!
//! #[tokio::main]
//! async fn main() -> redshift_dup::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let session = Session::connect(config).await?;
//!
//!     let mut duplicator = session.duplicator(ReflectionStrategy::Native);
//!     duplicator.create_full_schema("analytics").await?;
//!
//!     let mut populator = session.populator()?;
//!     let summary = populator.populate_all_tables("analytics", 100).await?;
//!     println!("Inserted {} rows", summary.total_rows);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod duplicate;
pub mod error;
pub mod pool;
pub mod populate;
pub mod reflect;
pub mod session;
pub mod source;
pub mod target;
pub mod typemap;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use crate::core::{
    BindOverride, BulkInsert, Column, ColumnType, DestinationDatabase, ExternalColumn,
    InsertStatement, MetadataSide, ReflectionStrategy, SampleRow, SchemaCache, SchemaReflector,
    SourceDatabase, Table,
};
pub use config::{Config, ConnectionConfig, CopyConfig, DestinationConfig, OdbcConfig};
pub use duplicate::SchemaDuplicator;
pub use error::{DupError, Result};
pub use pool::SslMode;
pub use populate::{override_for, PopulateSummary, SampleDataPopulator, TableSample};
pub use session::{health_check, HealthCheckResult, SchemaReport, Session};
pub use source::RedshiftSource;
pub use target::{OdbcBulkInserter, PgDestination};
