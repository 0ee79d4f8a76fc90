//! Table, column, and constraint metadata types.

use serde::{Deserialize, Serialize};

/// Table metadata reflected from a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Schema name.
    pub schema: String,

    /// Table name.
    pub name: String,

    /// Column definitions in ordinal order.
    pub columns: Vec<Column>,

    /// Primary key, unique and foreign key constraints.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl Table {
    /// Create a table without columns or constraints.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Builder-style helper to append a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Get the fully qualified table name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Clear every server-side default and identity marker.
    ///
    /// Inserts into the destination supply every value explicitly, which
    /// identity columns would otherwise reject.
    pub fn strip_defaults(&mut self) {
        for column in &mut self.columns {
            column.default = None;
            column.is_identity = false;
        }
    }

    /// Check if any column still carries a default or identity marker.
    pub fn has_defaults(&self) -> bool {
        self.columns
            .iter()
            .any(|c| c.default.is_some() || c.is_identity)
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Semantic data type.
    pub data_type: ColumnType,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Server-side default expression, if any.
    pub default: Option<String>,

    /// Whether the column is an identity column.
    pub is_identity: bool,

    /// Ordinal position (1-based).
    pub ordinal_pos: i32,
}

impl Column {
    /// Create a nullable column without a default.
    pub fn new(name: impl Into<String>, data_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_nullable: true,
            default: None,
            is_identity: false,
            ordinal_pos: 0,
        }
    }
}

/// Semantic column type.
///
/// Character lengths are `None` when the catalog reports no declared length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnType {
    SmallInt,
    Integer,
    BigInt,
    Boolean,
    Real,
    Double,
    Numeric {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    Char {
        length: Option<u32>,
    },
    Varchar {
        length: Option<u32>,
    },
    Date,
    Time,
    Timestamp,
    TimestampTz,
    /// Any type without a dedicated variant, kept as the catalog spelled it.
    Other {
        name: String,
    },
}

impl ColumnType {
    /// Declared length of a character type.
    pub fn char_length(&self) -> Option<u32> {
        match self {
            ColumnType::Char { length } | ColumnType::Varchar { length } => *length,
            _ => None,
        }
    }
}

/// Kind of a table constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
}

impl ConstraintKind {
    /// Map a `pg_constraint.contype` code.
    pub fn from_contype(code: &str) -> Option<Self> {
        match code {
            "p" => Some(ConstraintKind::PrimaryKey),
            "u" => Some(ConstraintKind::Unique),
            "f" => Some(ConstraintKind::ForeignKey),
            _ => None,
        }
    }
}

/// Table constraint replayed verbatim in the destination DDL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint name.
    pub name: String,

    /// Constraint kind.
    pub kind: ConstraintKind,

    /// Definition as rendered by `pg_get_constraintdef`, e.g. `PRIMARY KEY (id)`.
    pub definition: String,
}
