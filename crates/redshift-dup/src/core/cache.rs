//! Per-component cache of reflected table definitions.

use std::collections::BTreeMap;

use tracing::info;

use super::schema::Table;
use super::traits::SchemaReflector;
use crate::error::{DupError, Result};

/// Table definitions of exactly one schema.
///
/// Reflection is slow, so it only runs again when a different schema name is
/// requested. A mismatch discards every cached table; there is no partial
/// invalidation.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schema: Option<String>,
    tables: BTreeMap<String, Table>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema the cached tables belong to, if any.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Return the tables of `schema`, reflecting them first if the cache holds
    /// another schema or nothing at all.
    ///
    /// A failed reflection leaves the cache empty and unset.
    pub async fn get_or_refresh<R>(
        &mut self,
        reflector: &R,
        schema: &str,
    ) -> Result<&mut BTreeMap<String, Table>>
    where
        R: SchemaReflector + ?Sized,
    {
        if self.schema() != Some(schema) {
            info!("Set metadata schema to {}.", schema);
            self.schema = None;
            self.tables.clear();

            let tables = reflector.reflect_schema(schema).await?;
            self.tables = tables.into_iter().map(|t| (t.name.clone(), t)).collect();
            self.schema = Some(schema.to_string());
        }
        Ok(&mut self.tables)
    }

    /// Names of the cached tables.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Look up a cached table.
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables.get(name).ok_or_else(|| self.unknown(name))
    }

    /// Look up a cached table for mutation.
    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        let schema = self.schema.as_deref().unwrap_or_default();
        self.tables
            .get_mut(name)
            .ok_or_else(|| DupError::unknown_table(schema, name))
    }

    fn unknown(&self, name: &str) -> DupError {
        DupError::unknown_table(self.schema().unwrap_or_default(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeReflector;

    #[tokio::test]
    async fn test_same_schema_reflects_once() {
        let reflector = FakeReflector::with_schema("s1", &["a", "b"]);
        let mut cache = SchemaCache::new();

        cache.get_or_refresh(&reflector, "s1").await.unwrap();
        cache.get_or_refresh(&reflector, "s1").await.unwrap();
        cache.get_or_refresh(&reflector, "s1").await.unwrap();

        assert_eq!(reflector.calls(), vec!["s1".to_string()]);
        assert_eq!(cache.schema(), Some("s1"));
        assert_eq!(cache.table_names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_schema_change_discards_previous_tables() {
        let reflector = FakeReflector::with_schema("s1", &["a", "b"]).and_schema("s2", &["c"]);
        let mut cache = SchemaCache::new();

        cache.get_or_refresh(&reflector, "s1").await.unwrap();
        cache.get_or_refresh(&reflector, "s2").await.unwrap();
        assert_eq!(cache.table_names(), vec!["c"]);
        assert!(cache.table("a").is_err());

        cache.get_or_refresh(&reflector, "s1").await.unwrap();
        assert_eq!(cache.table_names(), vec!["a", "b"]);
        assert_eq!(reflector.calls(), vec!["s1", "s2", "s1"]);
    }

    #[tokio::test]
    async fn test_failed_reflection_leaves_cache_unset() {
        let reflector = FakeReflector::with_schema("s1", &["a"]).failing_on("broken");
        let mut cache = SchemaCache::new();

        cache.get_or_refresh(&reflector, "s1").await.unwrap();
        assert!(cache.get_or_refresh(&reflector, "broken").await.is_err());
        assert_eq!(cache.schema(), None);
        assert!(cache.table_names().is_empty());

        cache.get_or_refresh(&reflector, "s1").await.unwrap();
        assert_eq!(reflector.calls(), vec!["s1", "broken", "s1"]);
    }

    #[tokio::test]
    async fn test_unknown_table_lookup() {
        let reflector = FakeReflector::with_schema("s1", &["a"]);
        let mut cache = SchemaCache::new();
        cache.get_or_refresh(&reflector, "s1").await.unwrap();

        let err = cache.table_mut("missing").unwrap_err();
        assert!(matches!(
            err,
            DupError::UnknownTable { ref schema, ref table } if schema == "s1" && table == "missing"
        ));
    }
}
