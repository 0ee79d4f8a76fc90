//! Configuration validation.

use super::{Config, ConnectionConfig};
use crate::core::identifier::validate_identifier;
use crate::error::{DupError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    validate_connection("source", &config.source)?;
    validate_connection("destination", &config.destination.connection)?;

    let (src, dst) = (&config.source, &config.destination.connection);
    if src.host == dst.host && src.port == dst.port && src.database == dst.database {
        return Err(DupError::Config(
            "source and destination cannot be the same database".into(),
        ));
    }

    if config.destination.odbc.driver.is_empty() {
        return Err(DupError::Config(
            "destination.odbc.driver is required".into(),
        ));
    }

    if config.copy.sample_size == 0 {
        return Err(DupError::Config(
            "copy.sample_size must be at least 1".into(),
        ));
    }
    if config.copy.max_connections == 0 {
        return Err(DupError::Config(
            "copy.max_connections must be at least 1".into(),
        ));
    }

    for schema in &config.copy.schemas {
        validate_identifier(schema)
            .map_err(|e| DupError::Config(format!("copy.schemas: {}", e)))?;
    }

    Ok(())
}

fn validate_connection(section: &str, conn: &ConnectionConfig) -> Result<()> {
    if conn.host.is_empty() {
        return Err(DupError::Config(format!("{}.host is required", section)));
    }
    if conn.database.is_empty() {
        return Err(DupError::Config(format!("{}.database is required", section)));
    }
    if conn.user.is_empty() {
        return Err(DupError::Config(format!("{}.user is required", section)));
    }
    Ok(())
}
