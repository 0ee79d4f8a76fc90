//! Insert statement and bind override types.

use serde::{Deserialize, Serialize};

use super::identifier::ident_pg;
use crate::error::Result;

/// Buffer size, in characters, bound for long text columns.
pub const WIDE_CHAR_COLUMN_SIZE: usize = 100_000;

/// Declared length from which character columns get a wide binding.
pub const WIDE_CHAR_THRESHOLD: u32 = 100;

/// Wire type requested for a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindSqlType {
    /// `SQL_WVARCHAR`
    WideVarchar,
}

/// Explicit bind type for one parameter column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindOverride {
    pub sql_type: BindSqlType,
    pub column_size: usize,
    pub decimal_digits: i16,
}

impl BindOverride {
    /// Wide-character binding with a 100,000 character buffer.
    pub const fn wide_char() -> Self {
        Self {
            sql_type: BindSqlType::WideVarchar,
            column_size: WIDE_CHAR_COLUMN_SIZE,
            decimal_digits: 0,
        }
    }
}

/// Parameter-marker insert: `INSERT INTO <table> VALUES (?, ?, …)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    /// Table the rows go to, as written in the statement.
    pub table: String,
    /// Number of `?` markers.
    pub placeholders: usize,
    /// Statement text.
    pub sql: String,
}

impl InsertStatement {
    /// Build the statement for `table` with `placeholders` markers.
    pub fn new(table: &str, placeholders: usize) -> Result<Self> {
        let markers = vec!["?"; placeholders].join(", ");
        let sql = format!("INSERT INTO {} VALUES ({})", ident_pg(table)?, markers);
        Ok(Self {
            table: table.to_string(),
            placeholders,
            sql,
        })
    }
}
