//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{MetadataSide, ReflectionStrategy};
use crate::pool::SslMode;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source cluster (Redshift).
    pub source: ConnectionConfig,

    /// Destination database.
    pub destination: DestinationConfig,

    /// What to copy and how.
    #[serde(default)]
    pub copy: CopyConfig,
}

/// PostgreSQL-wire connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host.
    pub host: String,

    /// Database port (default: 5439).
    #[serde(default = "default_redshift_port")]
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// TLS mode (default: require).
    #[serde(default)]
    pub ssl_mode: SslMode,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

/// Destination settings: the DDL connection plus the ODBC insert connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    #[serde(flatten)]
    pub connection: ConnectionConfig,

    /// ODBC driver settings for the bulk-insert connection.
    #[serde(default)]
    pub odbc: OdbcConfig,
}

/// ODBC driver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdbcConfig {
    /// Driver name as registered with the driver manager.
    #[serde(default = "default_odbc_driver")]
    pub driver: String,

    /// Whether the driver reports booleans as characters.
    #[serde(default)]
    pub bools_as_char: bool,
}

impl Default for OdbcConfig {
    fn default() -> Self {
        Self {
            driver: default_odbc_driver(),
            bools_as_char: false,
        }
    }
}

/// Copy behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Schemas to copy, in order.
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Rows sampled per table (default: 100).
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Native catalog reflection or external table catalog.
    #[serde(default)]
    pub strategy: ReflectionStrategy,

    /// Engine whose column definitions drive bind overrides.
    #[serde(default)]
    pub metadata_from: MetadataSide,

    /// Pool size per side (default: 4).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            schemas: Vec::new(),
            sample_size: default_sample_size(),
            strategy: ReflectionStrategy::default(),
            metadata_from: MetadataSide::default(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_redshift_port() -> u16 {
    5439
}

fn default_odbc_driver() -> String {
    "Amazon Redshift (x64)".to_string()
}

fn default_sample_size() -> usize {
    100
}

fn default_max_connections() -> usize {
    4
}
