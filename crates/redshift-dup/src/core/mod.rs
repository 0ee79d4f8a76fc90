//! Core abstractions shared by the duplication and population components.
//!
//! - [`schema`]: Table, column, column type and constraint metadata
//! - [`identifier`]: Identifier validation and quoting
//! - [`insert`]: Parameter-marker insert statements and bind overrides
//! - [`cache`]: Schema-scoped cache of reflected tables
//! - [`traits`]: Seams to the source, the destination and the bulk inserter

pub mod cache;
pub mod identifier;
pub mod insert;
pub mod schema;
pub mod traits;

pub use cache::SchemaCache;
pub use insert::{BindOverride, BindSqlType, InsertStatement};
pub use schema::{Column, ColumnType, Constraint, ConstraintKind, Table};
pub use traits::{
    BulkInsert, DestinationDatabase, ExternalColumn, MetadataSide, ReflectionStrategy,
    SampleRow, SchemaReflector, SourceDatabase,
};
