//! Catalog reflection shared by the source and destination.

use tokio_postgres::Client;
use tracing::debug;

use crate::core::{Column, Constraint, ConstraintKind, Table};
use crate::typemap::parse_column_type;

const TABLES_QUERY: &str = r#"
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema = $1 AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        column_name::text,
        data_type::text,
        character_maximum_length::int4,
        numeric_precision::int4,
        numeric_scale::int4,
        CASE WHEN is_nullable = 'YES' THEN true ELSE false END,
        column_default::text,
        ordinal_position::int4
    FROM information_schema.columns
    WHERE table_schema = $1 AND table_name = $2
    ORDER BY ordinal_position
"#;

const CONSTRAINTS_QUERY: &str = r#"
    SELECT
        c.conname::text,
        c.contype::text,
        pg_get_constraintdef(c.oid)::text
    FROM pg_catalog.pg_constraint c
    JOIN pg_catalog.pg_class t ON t.oid = c.conrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
    WHERE n.nspname = $1 AND t.relname = $2 AND c.contype IN ('p', 'u', 'f')
    ORDER BY c.contype DESC, c.conname
"#;

/// Reflect every base table of `schema` with its columns and constraints.
pub async fn reflect_tables(
    client: &Client,
    schema: &str,
) -> std::result::Result<Vec<Table>, tokio_postgres::Error> {
    let rows = client.query(TABLES_QUERY, &[&schema]).await?;

    let mut tables = Vec::with_capacity(rows.len());
    for row in rows {
        let mut table = Table::new(schema, row.get::<_, String>(0));
        load_columns(client, &mut table).await?;
        load_constraints(client, &mut table).await?;
        tables.push(table);
    }

    debug!("Reflected {} tables from schema {}", tables.len(), schema);
    Ok(tables)
}

async fn load_columns(
    client: &Client,
    table: &mut Table,
) -> std::result::Result<(), tokio_postgres::Error> {
    let rows = client
        .query(COLUMNS_QUERY, &[&table.schema, &table.name])
        .await?;

    for row in rows {
        let data_type: String = row.get(1);
        let default: Option<String> = row.get(6);
        table.columns.push(Column {
            name: row.get(0),
            data_type: parse_column_type(&data_type, row.get(2), row.get(3), row.get(4)),
            is_nullable: row.get(5),
            is_identity: default.as_deref().map_or(false, is_identity_default),
            default,
            ordinal_pos: row.get(7),
        });
    }

    debug!(
        "Loaded {} columns for {}",
        table.columns.len(),
        table.full_name()
    );
    Ok(())
}

async fn load_constraints(
    client: &Client,
    table: &mut Table,
) -> std::result::Result<(), tokio_postgres::Error> {
    let rows = client
        .query(CONSTRAINTS_QUERY, &[&table.schema, &table.name])
        .await?;

    for row in rows {
        let code: String = row.get(1);
        if let Some(kind) = ConstraintKind::from_contype(&code) {
            table.constraints.push(Constraint {
                name: row.get(0),
                kind,
                definition: row.get(2),
            });
        }
    }
    Ok(())
}

/// Redshift reports identity columns through a `"identity"(…)` default.
pub(crate) fn is_identity_default(default: &str) -> bool {
    default.trim_start().starts_with("\"identity\"(")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_default_detection() {
        assert!(is_identity_default("\"identity\"(100482, 0, '1,1'::text)"));
        assert!(!is_identity_default("getdate()"));
        assert!(!is_identity_default("'identity'::character varying"));
    }
}
