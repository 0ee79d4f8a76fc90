//! In-memory fakes of the database traits for component tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::{
    BindOverride, BulkInsert, Column, ColumnType, DestinationDatabase, ExternalColumn,
    InsertStatement, SampleRow, SchemaReflector, SourceDatabase, Table,
};
use crate::error::{DupError, Result};

/// Reflector serving canned tables and counting reflections.
#[derive(Default)]
pub struct FakeReflector {
    schemas: HashMap<String, Vec<Table>>,
    fail_on: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeReflector {
    /// One schema whose tables each have a single `id integer` column.
    pub fn with_schema(schema: &str, tables: &[&str]) -> Self {
        Self::default().and_schema(schema, tables)
    }

    pub fn and_schema(self, schema: &str, tables: &[&str]) -> Self {
        let tables = tables
            .iter()
            .map(|name| Table::new(schema, *name).with_column(Column::new("id", ColumnType::Integer)))
            .collect();
        self.and_tables(schema, tables)
    }

    pub fn and_tables(mut self, schema: &str, tables: Vec<Table>) -> Self {
        self.schemas.insert(schema.to_string(), tables);
        self
    }

    pub fn failing_on(mut self, schema: &str) -> Self {
        self.fail_on = Some(schema.to_string());
        self
    }

    /// Schema names passed to `reflect_schema`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchemaReflector for FakeReflector {
    async fn reflect_schema(&self, schema: &str) -> Result<Vec<Table>> {
        self.calls.lock().unwrap().push(schema.to_string());
        if self.fail_on.as_deref() == Some(schema) {
            return Err(DupError::pool("reflection failed", schema));
        }
        Ok(self.schemas.get(schema).cloned().unwrap_or_default())
    }
}

/// Source with canned reflection, external catalog and sample rows.
#[derive(Default)]
pub struct FakeSource {
    pub reflector: FakeReflector,
    external_columns: HashMap<(String, String), Vec<ExternalColumn>>,
    external_tables: HashMap<String, Vec<String>>,
    samples: HashMap<String, Vec<SampleRow>>,
    sample_calls: Mutex<Vec<(String, String, usize)>>,
}

impl FakeSource {
    pub fn new(reflector: FakeReflector) -> Self {
        Self {
            reflector,
            ..Self::default()
        }
    }

    pub fn with_external_table(mut self, schema: &str, table: &str, columns: &[(&str, &str)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, ty)| ExternalColumn::new(*name, *ty))
            .collect();
        self.external_columns
            .insert((schema.to_string(), table.to_string()), columns);
        self.external_tables
            .entry(schema.to_string())
            .or_default()
            .push(table.to_string());
        self
    }

    pub fn with_sample(mut self, table: &str, rows: Vec<SampleRow>) -> Self {
        self.samples.insert(table.to_string(), rows);
        self
    }

    /// `(schema, table, limit)` of every `sample_rows` call.
    pub fn sample_calls(&self) -> Vec<(String, String, usize)> {
        self.sample_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchemaReflector for FakeSource {
    async fn reflect_schema(&self, schema: &str) -> Result<Vec<Table>> {
        self.reflector.reflect_schema(schema).await
    }
}

#[async_trait]
impl SourceDatabase for FakeSource {
    async fn external_columns(&self, schema: &str, table: &str) -> Result<Vec<ExternalColumn>> {
        Ok(self
            .external_columns
            .get(&(schema.to_string(), table.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn external_tables(&self, schema: &str) -> Result<Vec<String>> {
        Ok(self.external_tables.get(schema).cloned().unwrap_or_default())
    }

    async fn sample_rows(&self, schema: &str, table: &str, limit: usize) -> Result<Vec<SampleRow>> {
        self.sample_calls
            .lock()
            .unwrap()
            .push((schema.to_string(), table.to_string(), limit));
        let rows = self.samples.get(table).cloned().unwrap_or_default();
        Ok(rows.into_iter().take(limit).collect())
    }
}

/// What a [`FakeDestination`] was asked to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Executed {
    Statement(String),
    Batch(Vec<String>),
}

/// Destination recording every statement.
#[derive(Default)]
pub struct FakeDestination {
    pub reflector: FakeReflector,
    executed: Mutex<Vec<Executed>>,
}

impl FakeDestination {
    pub fn new(reflector: FakeReflector) -> Self {
        Self {
            reflector,
            executed: Mutex::new(Vec::new()),
        }
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.executed.lock().unwrap().clone()
    }

    /// Every statement, batches flattened.
    pub fn statements(&self) -> Vec<String> {
        self.executed()
            .into_iter()
            .flat_map(|e| match e {
                Executed::Statement(s) => vec![s],
                Executed::Batch(b) => b,
            })
            .collect()
    }
}

#[async_trait]
impl SchemaReflector for FakeDestination {
    async fn reflect_schema(&self, schema: &str) -> Result<Vec<Table>> {
        self.reflector.reflect_schema(schema).await
    }
}

#[async_trait]
impl DestinationDatabase for FakeDestination {
    async fn execute(&self, sql: &str) -> Result<()> {
        self.executed
            .lock()
            .unwrap()
            .push(Executed::Statement(sql.to_string()));
        Ok(())
    }

    async fn execute_batch(&self, statements: &[String]) -> Result<()> {
        self.executed
            .lock()
            .unwrap()
            .push(Executed::Batch(statements.to_vec()));
        Ok(())
    }
}

/// One call made on a [`RecordingInserter`].
#[derive(Debug, Clone, PartialEq)]
pub enum InsertCall {
    UseSchema(String),
    Execute {
        sql: String,
        overrides: Vec<Option<BindOverride>>,
        rows: Vec<SampleRow>,
    },
    Commit,
    Rollback,
}

/// Bulk inserter recording calls into a shared log.
#[derive(Clone, Default)]
pub struct RecordingInserter {
    log: Arc<Mutex<Vec<InsertCall>>>,
    failing_sql: Option<String>,
}

impl RecordingInserter {
    /// Fail `execute_many` for statements equal to `sql`, after logging them.
    pub fn failing_on(mut self, sql: &str) -> Self {
        self.failing_sql = Some(sql.to_string());
        self
    }

    pub fn calls(&self) -> Vec<InsertCall> {
        self.log.lock().unwrap().clone()
    }
}

impl BulkInsert for RecordingInserter {
    fn use_schema(&mut self, schema: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(InsertCall::UseSchema(schema.to_string()));
        Ok(())
    }

    fn execute_many(
        &mut self,
        statement: &InsertStatement,
        overrides: &[Option<BindOverride>],
        rows: &[SampleRow],
    ) -> Result<u64> {
        self.log.lock().unwrap().push(InsertCall::Execute {
            sql: statement.sql.clone(),
            overrides: overrides.to_vec(),
            rows: rows.to_vec(),
        });
        if self.failing_sql.as_deref() == Some(statement.sql.as_str()) {
            return Err(DupError::bulk_insert(&statement.table, "insert rejected"));
        }
        Ok(rows.len() as u64)
    }

    fn commit(&mut self) -> Result<()> {
        self.log.lock().unwrap().push(InsertCall::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.log.lock().unwrap().push(InsertCall::Rollback);
        Ok(())
    }
}

/// Build a sample row from literals, `None` for NULL.
pub fn row(values: &[Option<&str>]) -> SampleRow {
    values.iter().map(|v| v.map(str::to_string)).collect()
}
