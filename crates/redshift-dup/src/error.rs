//! Error types for the duplication library.

use thiserror::Error;

/// Main error type for schema duplication and sample population.
#[derive(Error, Debug)]
pub enum DupError {
    /// Configuration error (invalid YAML, missing fields, bad identifiers, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database query error (reflection, catalog views, sampling)
    #[error("Source database error: {0}")]
    Source(#[source] tokio_postgres::Error),

    /// Destination database query error (DDL, reflection)
    #[error("Destination database error: {0}")]
    Destination(#[source] tokio_postgres::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// ODBC driver error on the bulk-insert connection
    #[error("ODBC error: {0}")]
    Odbc(#[from] odbc_api::Error),

    /// Bulk insert failed for a specific table
    #[error("Bulk insert failed for table {table}: {message}")]
    BulkInsert { table: String, message: String },

    /// Table is not part of the reflected schema
    #[error("Table {table} not found in schema {schema}")]
    UnknownTable { schema: String, table: String },

    /// Insert statement requested for an empty row sample
    #[error("Cannot build an insert statement for table {0} from an empty sample")]
    EmptySample(String),

    /// IO error (config file, log file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub const EXIT_CONFIG_ERROR: u8 = 1;
pub const EXIT_SOURCE_ERROR: u8 = 2;
pub const EXIT_DESTINATION_ERROR: u8 = 3;
pub const EXIT_POOL_ERROR: u8 = 4;
pub const EXIT_INSERT_ERROR: u8 = 5;
pub const EXIT_LOOKUP_ERROR: u8 = 6;
pub const EXIT_IO_ERROR: u8 = 7;

impl DupError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        DupError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a BulkInsert error
    pub fn bulk_insert(table: impl Into<String>, message: impl Into<String>) -> Self {
        DupError::BulkInsert {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an UnknownTable error
    pub fn unknown_table(schema: impl Into<String>, table: impl Into<String>) -> Self {
        DupError::UnknownTable {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            DupError::Config(_) | DupError::Yaml(_) | DupError::Json(_) => EXIT_CONFIG_ERROR,
            DupError::Source(_) => EXIT_SOURCE_ERROR,
            DupError::Destination(_) => EXIT_DESTINATION_ERROR,
            DupError::Pool { .. } => EXIT_POOL_ERROR,
            DupError::Odbc(_) | DupError::BulkInsert { .. } => EXIT_INSERT_ERROR,
            DupError::UnknownTable { .. } | DupError::EmptySample(_) => EXIT_LOOKUP_ERROR,
            DupError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for duplication operations.
pub type Result<T> = std::result::Result<T, DupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(DupError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(DupError::pool("x", "y").exit_code(), EXIT_POOL_ERROR);
        assert_eq!(DupError::bulk_insert("t", "x").exit_code(), EXIT_INSERT_ERROR);
        assert_eq!(DupError::unknown_table("s", "t").exit_code(), EXIT_LOOKUP_ERROR);
        assert_eq!(DupError::EmptySample("t".into()).exit_code(), EXIT_LOOKUP_ERROR);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(DupError::from(io).exit_code(), EXIT_IO_ERROR);
    }

    #[test]
    fn test_format_detailed_includes_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.yaml missing");
        let err = DupError::from(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error: config.yaml missing"));
    }

    #[test]
    fn test_unknown_table_message() {
        let err = DupError::unknown_table("analytics", "events");
        assert_eq!(err.to_string(), "Table events not found in schema analytics");
    }
}
