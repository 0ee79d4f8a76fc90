//! Type mapping between catalog type names and [`ColumnType`].

use crate::core::ColumnType;

/// Parse an `information_schema.columns.data_type` value.
///
/// Length, precision and scale come from `character_maximum_length`,
/// `numeric_precision` and `numeric_scale`; non-positive values mean the
/// catalog reported none.
pub fn parse_column_type(
    data_type: &str,
    char_len: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> ColumnType {
    let length = positive(char_len);
    match data_type.trim().to_lowercase().as_str() {
        // Integer types
        "smallint" | "int2" => ColumnType::SmallInt,
        "integer" | "int" | "int4" => ColumnType::Integer,
        "bigint" | "int8" => ColumnType::BigInt,

        "boolean" | "bool" => ColumnType::Boolean,

        // Floating point
        "real" | "float4" => ColumnType::Real,
        "double precision" | "float8" | "float" => ColumnType::Double,

        "numeric" | "decimal" => ColumnType::Numeric {
            precision: positive(precision),
            scale: scale.and_then(|s| u32::try_from(s).ok()),
        },

        // String types
        "character" | "char" | "bpchar" | "nchar" => ColumnType::Char { length },
        "character varying" | "varchar" | "nvarchar" | "text" => ColumnType::Varchar { length },

        // Date/time types
        "date" => ColumnType::Date,
        "time without time zone" | "time" => ColumnType::Time,
        "timestamp without time zone" | "timestamp" => ColumnType::Timestamp,
        "timestamp with time zone" | "timestamptz" => ColumnType::TimestampTz,

        other => ColumnType::Other {
            name: other.to_string(),
        },
    }
}

/// Render a column type as destination DDL.
pub fn column_type_sql(ty: &ColumnType) -> String {
    match ty {
        ColumnType::SmallInt => "smallint".to_string(),
        ColumnType::Integer => "integer".to_string(),
        ColumnType::BigInt => "bigint".to_string(),
        ColumnType::Boolean => "boolean".to_string(),
        ColumnType::Real => "real".to_string(),
        ColumnType::Double => "double precision".to_string(),
        ColumnType::Numeric {
            precision: Some(p),
            scale,
        } => format!("numeric({},{})", p, scale.unwrap_or(0)),
        ColumnType::Numeric { precision: None, .. } => "numeric".to_string(),
        ColumnType::Char { length: Some(n) } => format!("char({})", n),
        ColumnType::Char { length: None } => "char".to_string(),
        ColumnType::Varchar { length: Some(n) } => format!("varchar({})", n),
        ColumnType::Varchar { length: None } => "varchar".to_string(),
        ColumnType::Date => "date".to_string(),
        ColumnType::Time => "time".to_string(),
        ColumnType::Timestamp => "timestamp".to_string(),
        ColumnType::TimestampTz => "timestamptz".to_string(),
        ColumnType::Other { name } => name.clone(),
    }
}

fn positive(value: Option<i32>) -> Option<u32> {
    value.filter(|v| *v > 0).and_then(|v| u32::try_from(v).ok())
}
