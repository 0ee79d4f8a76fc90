//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

impl DestinationConfig {
    /// Build the connection string for the ODBC bulk-insert connection.
    pub fn odbc_connection_string(&self) -> String {
        let c = &self.connection;
        format!(
            "Driver={{{}}};Server={};Database={};UID={};PWD={};Port={};BoolsAsChar={}",
            self.odbc.driver,
            c.host,
            c.database,
            c.user,
            odbc_value(&c.password),
            c.port,
            u8::from(self.odbc.bools_as_char)
        )
    }
}

/// Brace-quote an attribute value that would otherwise break the string.
fn odbc_value(value: &str) -> String {
    if value.contains([';', '{', '}']) {
        format!("{{{}}}", value.replace('}', "}}"))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MetadataSide, ReflectionStrategy};
    use crate::pool::SslMode;

    const YAML: &str = r#"
source:
  host: cluster.abc.us-east-1.redshift.amazonaws.com
  database: prod
  user: reader
  password: secret
destination:
  host: dev-cluster.local
  database: dev
  user: writer
  password: "p;w"
  ssl_mode: disable
copy:
  schemas: [analytics]
  strategy: external
"#;

    #[test]
    fn test_from_yaml_applies_defaults() {
        let config = Config::from_yaml(YAML).unwrap();
        assert_eq!(config.source.port, 5439);
        assert_eq!(config.source.ssl_mode, SslMode::Require);
        assert_eq!(config.destination.connection.ssl_mode, SslMode::Disable);
        assert_eq!(config.destination.odbc.driver, "Amazon Redshift (x64)");
        assert_eq!(config.copy.sample_size, 100);
        assert_eq!(config.copy.max_connections, 4);
        assert_eq!(config.copy.strategy, ReflectionStrategy::External);
        assert_eq!(config.copy.metadata_from, MetadataSide::Destination);
    }

    #[test]
    fn test_odbc_connection_string() {
        let config = Config::from_yaml(YAML).unwrap();
        assert_eq!(
            config.destination.odbc_connection_string(),
            "Driver={Amazon Redshift (x64)};Server=dev-cluster.local;Database=dev;\
             UID=writer;PWD={p;w};Port=5439;BoolsAsChar=0"
        );
    }

    #[test]
    fn test_from_yaml_rejects_unknown_strategy() {
        let yaml = YAML.replace("strategy: external", "strategy: spectrum");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Config::load("/nonexistent/redshift-dup.yaml").unwrap_err();
        assert!(matches!(err, crate::error::DupError::Io(_)));
    }
}
