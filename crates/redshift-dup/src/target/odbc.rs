//! ODBC bulk inserter for sample rows.
//!
//! Sample values arrive as text, so every parameter is bound as a character
//! buffer and the driver converts on the server side. Plain columns get a
//! narrow text buffer sized to the longest value in the batch; columns with a
//! [`BindOverride`] get a wide-character buffer of the override's size, which
//! keeps the driver from truncating long text. Wide buffers are large, so a
//! sample is sent in as many batches as it takes to keep the bound buffers
//! under a fixed byte budget.
//!
//! **Requirements:** an ODBC driver manager (unixODBC on Linux/macOS) and the
//! destination's ODBC driver must be installed.

use std::sync::OnceLock;

use odbc_api::buffers::{AnySliceMut, BufferDesc};
use odbc_api::{Connection, ConnectionOptions, Environment};
use tracing::{debug, info};

use crate::config::DestinationConfig;
use crate::core::identifier::ident_pg;
use crate::core::{BindOverride, BindSqlType, BulkInsert, InsertStatement, SampleRow};
use crate::error::{DupError, Result};

/// Upper bound for the parameter buffers of one insert batch.
const INSERT_BUFFER_BYTES: usize = 64 * 1024 * 1024;

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

/// Process-wide ODBC environment; connections borrow it for `'static`.
fn environment() -> Result<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new().map_err(|e| {
        DupError::pool(
            format!(
                "Failed to create ODBC environment: {}.\n\n\
                 Install an ODBC driver manager (unixODBC on Linux/macOS) and the \
                 destination's ODBC driver.",
                e
            ),
            "ODBC connection",
        )
    })?;
    // A concurrent initializer may have won; either environment is equivalent.
    let _ = ENVIRONMENT.set(env);
    ENVIRONMENT
        .get()
        .ok_or_else(|| DupError::pool("ODBC environment unavailable", "ODBC connection"))
}

/// One ODBC connection with autocommit off, held until dropped.
pub struct OdbcBulkInserter {
    conn: Connection<'static>,
}

impl OdbcBulkInserter {
    /// Open the connection described by the destination config.
    pub fn connect(config: &DestinationConfig) -> Result<Self> {
        let env = environment()?;
        let c = &config.connection;

        debug!(
            "ODBC connection string (credentials hidden): Driver={{{}}};Server={};Database={};Port={};...",
            config.odbc.driver, c.host, c.database, c.port
        );

        let conn = env
            .connect_with_connection_string(
                &config.odbc_connection_string(),
                ConnectionOptions::default(),
            )
            .map_err(|e| {
                DupError::pool(
                    format!("Failed to connect to destination via ODBC: {}", e),
                    "ODBC connection",
                )
            })?;
        conn.set_autocommit(false)?;

        info!(
            "Connected to destination via ODBC: {}:{}/{}",
            c.host, c.port, c.database
        );
        Ok(Self { conn })
    }

    /// Check the connection with `SELECT 1`.
    pub fn ping(&self) -> Result<()> {
        self.conn.execute("SELECT 1", ())?;
        Ok(())
    }
}

impl BulkInsert for OdbcBulkInserter {
    fn use_schema(&mut self, schema: &str) -> Result<()> {
        let sql = format!("SET search_path TO {}", ident_pg(schema)?);
        debug!("Executing: {}", sql);
        self.conn.execute(&sql, ())?;
        Ok(())
    }

    fn execute_many(
        &mut self,
        statement: &InsertStatement,
        overrides: &[Option<BindOverride>],
        rows: &[SampleRow],
    ) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let descs = buffer_descriptions(statement, overrides, rows)?;
        let batch_size = rows_per_batch(&descs, INSERT_BUFFER_BYTES).min(rows.len());
        debug!(
            "Executing: {} ({} rows, {} per batch)",
            statement.sql,
            rows.len(),
            batch_size
        );

        let prepared = self.conn.prepare(&statement.sql)?;
        let mut inserter = prepared.into_column_inserter(batch_size, descs.iter().copied())?;

        for chunk in rows.chunks(batch_size) {
            inserter.set_num_rows(chunk.len());
            for (col_idx, desc) in descs.iter().enumerate() {
                match inserter.column_mut(col_idx) {
                    AnySliceMut::Text(mut col) => {
                        for (row_idx, row) in chunk.iter().enumerate() {
                            col.set_cell(row_idx, row[col_idx].as_deref().map(str::as_bytes));
                        }
                    }
                    AnySliceMut::WText(mut col) => {
                        for (row_idx, row) in chunk.iter().enumerate() {
                            let wide = row[col_idx]
                                .as_deref()
                                .map(|v| v.encode_utf16().collect::<Vec<u16>>());
                            col.set_cell(row_idx, wide.as_deref());
                        }
                    }
                    _ => {
                        return Err(DupError::bulk_insert(
                            &statement.table,
                            format!("unexpected buffer for column {}: {:?}", col_idx, desc),
                        ))
                    }
                }
            }
            inserter.execute()?;
        }

        Ok(rows.len() as u64)
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.commit()?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn.rollback()?;
        Ok(())
    }
}

/// Number of rows bound per execution, so the parameter buffers of one batch
/// stay within `budget` bytes. At least one row is always bound.
fn rows_per_batch(descs: &[BufferDesc], budget: usize) -> usize {
    let per_row: usize = descs.iter().map(BufferDesc::bytes_per_row).sum();
    (budget / per_row.max(1)).max(1)
}

/// Buffer layout for a batch: one description per placeholder.
///
/// Validates the row shapes and value sizes up front, since writing an
/// oversized value into a bound buffer is not recoverable.
fn buffer_descriptions(
    statement: &InsertStatement,
    overrides: &[Option<BindOverride>],
    rows: &[SampleRow],
) -> Result<Vec<BufferDesc>> {
    let n = statement.placeholders;
    if let Some(bad) = rows.iter().position(|r| r.len() != n) {
        return Err(DupError::bulk_insert(
            &statement.table,
            format!(
                "row {} has {} values, statement expects {}",
                bad,
                rows[bad].len(),
                n
            ),
        ));
    }

    (0..n)
        .map(|i| {
            let values = rows.iter().filter_map(|r| r[i].as_deref());
            match overrides.get(i).copied().flatten() {
                Some(BindOverride {
                    sql_type: BindSqlType::WideVarchar,
                    column_size,
                    ..
                }) => {
                    if let Some(len) = values
                        .map(|v| v.encode_utf16().count())
                        .find(|len| *len > column_size)
                    {
                        return Err(DupError::bulk_insert(
                            &statement.table,
                            format!(
                                "value of {} characters in column {} exceeds bind size {}",
                                len, i, column_size
                            ),
                        ));
                    }
                    Ok(BufferDesc::WText {
                        max_str_len: column_size,
                    })
                }
                None => Ok(BufferDesc::Text {
                    max_str_len: values.map(str::len).max().unwrap_or(0).max(1),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::row;

    #[test]
    fn test_buffer_descriptions_sizes_text_to_longest_value() {
        let stmt = InsertStatement::new("t", 2).unwrap();
        let rows = vec![row(&[Some("1"), Some("alpha")]), row(&[Some("22"), None])];
        let descs = buffer_descriptions(&stmt, &[None, None], &rows).unwrap();
        assert!(matches!(descs[0], BufferDesc::Text { max_str_len: 2 }));
        assert!(matches!(descs[1], BufferDesc::Text { max_str_len: 5 }));
    }

    #[test]
    fn test_buffer_descriptions_all_null_column() {
        let stmt = InsertStatement::new("t", 1).unwrap();
        let rows = vec![row(&[None]), row(&[None])];
        let descs = buffer_descriptions(&stmt, &[None], &rows).unwrap();
        assert!(matches!(descs[0], BufferDesc::Text { max_str_len: 1 }));
    }

    #[test]
    fn test_buffer_descriptions_wide_override() {
        let stmt = InsertStatement::new("t", 2).unwrap();
        let rows = vec![row(&[Some("1"), Some("a")])];
        let overrides = [None, Some(BindOverride::wide_char())];
        let descs = buffer_descriptions(&stmt, &overrides, &rows).unwrap();
        assert!(matches!(descs[0], BufferDesc::Text { .. }));
        assert!(matches!(descs[1], BufferDesc::WText { max_str_len: 100_000 }));
    }

    #[test]
    fn test_buffer_descriptions_rejects_oversized_value() {
        let stmt = InsertStatement::new("t", 1).unwrap();
        let long = "x".repeat(100_001);
        let rows = vec![row(&[Some(long.as_str())])];
        let err = buffer_descriptions(&stmt, &[Some(BindOverride::wide_char())], &rows).unwrap_err();
        assert!(matches!(err, DupError::BulkInsert { ref table, .. } if table == "t"));
    }

    #[test]
    fn test_buffer_descriptions_rejects_ragged_rows() {
        let stmt = InsertStatement::new("t", 2).unwrap();
        let rows = vec![row(&[Some("1"), Some("a")]), row(&[Some("2")])];
        let err = buffer_descriptions(&stmt, &[None, None], &rows).unwrap_err();
        assert!(err.to_string().contains("row 1 has 1 values"));
    }

    #[test]
    fn test_rows_per_batch_bounds_wide_buffers() {
        let stmt = InsertStatement::new("t", 30).unwrap();
        let values = vec![Some("x"); 30];
        let rows = vec![row(&values); 100];
        let overrides = vec![Some(BindOverride::wide_char()); 30];
        let descs = buffer_descriptions(&stmt, &overrides, &rows).unwrap();

        let per_row: usize = descs.iter().map(BufferDesc::bytes_per_row).sum();
        let batch = rows_per_batch(&descs, INSERT_BUFFER_BYTES);
        assert!(batch < 100);
        assert!(batch * per_row <= INSERT_BUFFER_BYTES);
    }

    #[test]
    fn test_rows_per_batch_exact_budget() {
        let descs = [BufferDesc::Text { max_str_len: 10 }, BufferDesc::WText { max_str_len: 10 }];
        let per_row: usize = descs.iter().map(BufferDesc::bytes_per_row).sum();
        assert_eq!(rows_per_batch(&descs, per_row * 7), 7);
        assert_eq!(rows_per_batch(&descs, per_row * 7 + per_row - 1), 7);
    }

    #[test]
    fn test_rows_per_batch_at_least_one_row() {
        let descs = [BufferDesc::WText { max_str_len: 100_000 }];
        assert_eq!(rows_per_batch(&descs, 1), 1);
        assert_eq!(rows_per_batch(&[], INSERT_BUFFER_BYTES), INSERT_BUFFER_BYTES);
    }
}
