//! DDL generation for the destination.

use crate::core::identifier::quote_pg;
use crate::core::{Column, ExternalColumn, Table};
use crate::error::{DupError, Result};
use crate::typemap::column_type_sql;

/// `CREATE SCHEMA IF NOT EXISTS "<schema>"`.
pub fn create_schema_sql(schema: &str) -> Result<String> {
    Ok(format!("CREATE SCHEMA IF NOT EXISTS {}", quote_pg(schema)?))
}

/// `CREATE TABLE IF NOT EXISTS` for a reflected table, constraints inline.
pub fn create_table_sql(table: &Table) -> Result<String> {
    if table.columns.is_empty() {
        return Err(DupError::Config(format!(
            "Table {} has no columns",
            table.full_name()
        )));
    }

    let mut lines = Vec::with_capacity(table.columns.len() + table.constraints.len());
    for col in &table.columns {
        lines.push(column_sql(col)?);
    }
    for constraint in &table.constraints {
        lines.push(format!(
            "CONSTRAINT {} {}",
            quote_pg(&constraint.name)?,
            constraint.definition
        ));
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {}.{} (\n    {}\n)",
        quote_pg(&table.schema)?,
        quote_pg(&table.name)?,
        lines.join(",\n    ")
    ))
}

/// `CREATE TABLE IF NOT EXISTS` from external catalog pairs, types verbatim.
pub fn create_external_table_sql(
    schema: &str,
    table: &str,
    columns: &[ExternalColumn],
) -> Result<String> {
    if columns.is_empty() {
        return Err(DupError::Config(format!(
            "External table {}.{} has no columns",
            schema, table
        )));
    }

    let defs = columns
        .iter()
        .map(|c| Ok(format!("{} {}", quote_pg(&c.name)?, c.external_type)))
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {}.{} ({})",
        quote_pg(schema)?,
        quote_pg(table)?,
        defs.join(", ")
    ))
}

fn column_sql(col: &Column) -> Result<String> {
    let mut sql = format!("{} {}", quote_pg(&col.name)?, column_type_sql(&col.data_type));

    if col.is_identity {
        let (seed, step) = col
            .default
            .as_deref()
            .and_then(identity_seed_step)
            .unwrap_or((1, 1));
        sql.push_str(&format!(" IDENTITY({},{})", seed, step));
    } else if let Some(default) = &col.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(default);
    }

    if !col.is_nullable {
        sql.push_str(" NOT NULL");
    }
    Ok(sql)
}

/// Seed and step from a `"identity"(oid, 0, 'seed,step'::text)` default.
fn identity_seed_step(default: &str) -> Option<(i64, i64)> {
    let start = default.find('\'')? + 1;
    let len = default[start..].find('\'')?;
    let (seed, step) = default[start..start + len].split_once(',')?;
    Some((seed.trim().parse().ok()?, step.trim().parse().ok()?))
}
