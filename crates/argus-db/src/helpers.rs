//! Row-to-entity parsing helpers.
//!
//! Rows come back column-indexed; these helpers convert columns into the
//! typed entity fields and handle both RFC 3339 timestamps (what we write)
//! and `SQLite`'s `datetime('now')` format (what manual edits produce).

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string is in neither format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a `snake_case` serde enum such as `RunStatus`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string matches no variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column is an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER column into an unsigned field.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the value is negative or out of range.
pub fn get_unsigned<T: TryFrom<i64>>(row: &libsql::Row, idx: i32) -> Result<T, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    T::try_from(raw).map_err(|_| DatabaseError::Query(format!("column {idx} out of range: {raw}")))
}

/// Convert an unsigned value for an INTEGER column, saturating at `i64::MAX`.
#[must_use]
pub fn to_sql_int<T: TryInto<i64>>(value: T) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_core::enums::RunStatus;
    use chrono::Datelike;
    use rstest::rstest;

    #[test]
    fn parses_both_datetime_formats() {
        let rfc = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let sqlite = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(rfc, sqlite);
        assert_eq!(rfc.year(), 2026);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn empty_optional_datetime_is_none() {
        assert_eq!(parse_optional_datetime(Some("")).unwrap(), None);
        assert_eq!(parse_optional_datetime(None).unwrap(), None);
    }

    #[rstest]
    #[case("pending", RunStatus::Pending)]
    #[case("partial", RunStatus::Partial)]
    #[case("cancelled", RunStatus::Cancelled)]
    fn parses_snake_case_enums(#[case] raw: &str, #[case] expected: RunStatus) {
        assert_eq!(parse_enum::<RunStatus>(raw).unwrap(), expected);
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        assert!(parse_enum::<RunStatus>("exploded").is_err());
    }

    #[test]
    fn sql_ints_saturate() {
        assert_eq!(to_sql_int(7u32), 7);
        assert_eq!(to_sql_int(u64::MAX), i64::MAX);
    }
}
