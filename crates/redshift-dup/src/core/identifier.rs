//! Identifier validation and quoting for generated SQL.
//!
//! Schema, table and column names cannot be bound as statement parameters, so
//! every name that ends up in generated DDL or DML goes through this module:
//!
//! 1. Validate the name (no null bytes, not empty, within Redshift's length limit)
//! 2. Quote it with double quotes when it cannot be written bare
//! 3. Escape embedded double quotes by doubling them

use crate::error::{DupError, Result};

/// Maximum identifier length in bytes accepted by Redshift.
const MAX_IDENTIFIER_LENGTH: usize = 127;

/// Words that must be quoted even though they look like plain identifiers:
/// PostgreSQL's reserved and type/function-name keywords plus Redshift's
/// reserved words. Kept sorted for binary search.
const RESERVED: &[&str] = &[
    "aes128", "aes256", "all", "allowoverwrite", "analyse", "analyze", "and", "any", "array", "as",
    "asc", "asymmetric", "authorization", "az64", "backup", "between", "binary", "blanksasnull",
    "both", "bytedict", "bzip2", "case", "cast", "check", "collate", "collation", "column",
    "concurrently", "constraint", "create", "credentials", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "current_user_id", "default", "deferrable", "deflate", "defrag", "delta",
    "delta32k", "desc", "disable", "distinct", "do", "else", "emptyasnull", "enable", "encode",
    "encrypt", "encryption", "end", "except", "explicit", "false", "fetch", "for", "foreign",
    "freeze", "from", "full", "globaldict256", "globaldict64k", "grant", "group", "gzip", "having",
    "identity", "ignore", "ilike", "in", "initially", "inner", "intersect", "interval", "into",
    "is", "isnull", "join", "language", "lateral", "leading", "left", "like", "limit", "localtime",
    "localtimestamp", "lun", "luns", "lzo", "lzop", "minus", "mostly16", "mostly32", "mostly8",
    "natural", "new", "not", "notnull", "null", "nulls", "off", "offline", "offset", "oid", "old",
    "on", "only", "open", "or", "order", "outer", "overlaps", "parallel", "partition", "percent",
    "permissions", "pivot", "placing", "primary", "raw", "readratio", "recover", "references",
    "rejectlog", "resort", "respect", "restore", "returning", "right", "select", "session_user",
    "similar", "snapshot", "some", "symmetric", "sysdate", "system", "system_user", "table",
    "tablesample", "tag", "tdes", "text255", "text32k", "then", "timestamp", "to", "top",
    "trailing", "true", "truncatecolumns", "union", "unique", "unnest", "unpivot", "user", "using",
    "variadic", "verbose", "wallet", "when", "where", "window", "with", "without",
];

/// Validate an identifier.
///
/// Rejects empty names, names containing null bytes and names longer than
/// the Redshift limit.
///
/// # Errors
///
/// Returns `DupError::Config` with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DupError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(DupError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(DupError::Config(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Always double-quote an identifier.
pub fn quote_pg(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Render an identifier bare when the server would fold it to itself,
/// quoted otherwise.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(ident_pg("events")?, "events");
/// assert_eq!(ident_pg("Events")?, "\"Events\"");
/// assert_eq!(ident_pg("user")?, "\"user\"");
/// ```
pub fn ident_pg(name: &str) -> Result<String> {
    validate_identifier(name)?;
    if is_bare_identifier(name) {
        Ok(name.to_string())
    } else {
        quote_pg(name)
    }
}

/// Qualify a table name with its schema.
pub fn qualify_pg(schema: &str, table: &str) -> Result<String> {
    Ok(format!("{}.{}", ident_pg(schema)?, ident_pg(table)?))
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let first_ok = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    first_ok
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
        && RESERVED.binary_search(&name).is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier_normal() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("my_table").is_ok());
        assert!(validate_identifier("column with spaces").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_empty() {
        let result = validate_identifier("");
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        let result = validate_identifier("table\0name");
        assert!(result.unwrap_err().to_string().contains("null byte"));
    }

    #[test]
    fn test_validate_identifier_length_limit() {
        assert!(validate_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH)).is_ok());
        let result = validate_identifier(&"a".repeat(MAX_IDENTIFIER_LENGTH + 1));
        assert!(result.unwrap_err().to_string().contains("maximum length"));
    }

    #[test]
    fn test_quote_pg() {
        assert_eq!(quote_pg("users").unwrap(), "\"users\"");
        assert_eq!(quote_pg("table\"name").unwrap(), "\"table\"\"name\"");
    }

    #[test]
    fn test_ident_pg_bare_and_quoted() {
        assert_eq!(ident_pg("events").unwrap(), "events");
        assert_eq!(ident_pg("_tmp$1").unwrap(), "_tmp$1");
        assert_eq!(ident_pg("Events").unwrap(), "\"Events\"");
        assert_eq!(ident_pg("1st").unwrap(), "\"1st\"");
        assert_eq!(ident_pg("my col").unwrap(), "\"my col\"");
        assert_eq!(ident_pg("user").unwrap(), "\"user\"");
        assert_eq!(ident_pg("order").unwrap(), "\"order\"");
    }

    #[test]
    fn test_ident_pg_quotes_keywords() {
        for word in [
            "window",
            "fetch",
            "returning",
            "lateral",
            "freeze",
            "ilike",
            "isnull",
            "notnull",
            "overlaps",
            "tablesample",
            "collation",
            "concurrently",
            "binary",
            "current_schema",
            "variadic",
            "symmetric",
            "placing",
            "identity",
            "top",
        ] {
            assert_eq!(ident_pg(word).unwrap(), format!("\"{}\"", word));
        }
        assert_eq!(ident_pg("windows").unwrap(), "windows");
    }

    #[test]
    fn test_reserved_is_sorted() {
        assert!(RESERVED.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_qualify_pg() {
        assert_eq!(qualify_pg("analytics", "events").unwrap(), "analytics.events");
        assert_eq!(qualify_pg("Sales", "user").unwrap(), "\"Sales\".\"user\"");
        assert!(qualify_pg("", "t").is_err());
    }
}
