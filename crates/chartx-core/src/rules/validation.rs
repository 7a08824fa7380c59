use crate::errors::{ChartXError, Result};
use crate::model::operation::ColumnMap;
use crate::model::table::TableName;
use std::collections::BTreeSet;

/// Keys owned by the engine; never accepted from caller input
pub const ENGINE_OWNED_COLUMNS: [&str; 2] = ["patient_id", "last_updated"];

/// Validate a column name before it is used as a quoted identifier
///
/// Accepted names start with an ASCII letter or underscore and continue with
/// ASCII letters, digits, or underscores.
///
/// # Errors
/// Returns `InvalidColumnName` for anything else.
pub fn validate_column_name(table: TableName, column: &str) -> Result<()> {
    let mut chars = column.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ChartXError::InvalidColumnName {
            table: table.to_string(),
            column: column.to_string(),
        })
    }
}

/// Validate every column name in a map
///
/// # Errors
/// Returns the first `InvalidColumnName` encountered.
pub fn validate_columns(table: TableName, columns: &ColumnMap) -> Result<()> {
    columns
        .keys()
        .try_for_each(|column| validate_column_name(table, column))
}

/// Drop engine-owned keys from caller input
pub fn strip_engine_owned(table: TableName, columns: &mut ColumnMap) {
    for key in ENGINE_OWNED_COLUMNS {
        if columns.remove(key).is_some() {
            tracing::debug!(
                table = %table,
                column = key,
                "Dropped engine-owned column from input"
            );
        }
    }
}

/// Require every record of a replace set to carry the same non-null columns
///
/// An explicit null counts as an absent key. Records with no non-null value
/// are skipped here; [`strip_null_records`] discards them.
///
/// # Errors
/// Returns `ColumnSetMismatch` naming the first record that differs.
pub fn check_record_columns(table: TableName, records: &[ColumnMap]) -> Result<()> {
    let mut populated = records
        .iter()
        .enumerate()
        .map(|(index, record)| (index, non_null_keys(record)))
        .filter(|(_, keys)| !keys.is_empty());

    let Some((_, expected)) = populated.next() else {
        return Ok(());
    };

    for (record_index, found) in populated {
        if found != expected {
            return Err(ChartXError::ColumnSetMismatch {
                table: table.to_string(),
                record_index,
                expected: expected.iter().map(|s| s.to_string()).collect(),
                found: found.iter().map(|s| s.to_string()).collect(),
            });
        }
    }

    Ok(())
}

fn non_null_keys(record: &ColumnMap) -> BTreeSet<&String> {
    record
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, _)| k)
        .collect()
}

/// Drop null values from every record, then discard records left empty
pub fn strip_null_records(records: Vec<ColumnMap>) -> Vec<ColumnMap> {
    records
        .iter()
        .map(without_nulls)
        .filter(|record| !record.is_empty())
        .collect()
}

/// Drop null-valued columns; used for single-row writes
pub fn without_nulls(columns: &ColumnMap) -> ColumnMap {
    columns
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, serde_json::Value)]) -> ColumnMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_column_name_rules() {
        assert!(validate_column_name(TableName::Patients, "DOB").is_ok());
        assert!(validate_column_name(TableName::Patients, "_x1").is_ok());
        assert!(validate_column_name(TableName::Patients, "").is_err());
        assert!(validate_column_name(TableName::Patients, "1abc").is_err());
        assert!(validate_column_name(TableName::Patients, "name\"; DROP").is_err());
    }

    #[test]
    fn test_strip_engine_owned() {
        let mut cols = record(&[
            ("patient_id", json!(4)),
            ("last_updated", json!("2024-01-01")),
            ("full_name", json!("A")),
        ]);
        strip_engine_owned(TableName::Patients, &mut cols);
        assert_eq!(cols.len(), 1);
        assert!(cols.contains_key("full_name"));
    }

    #[test]
    fn test_record_column_mismatch_reports_index() {
        let records = vec![
            record(&[("symptom_description", json!("cough"))]),
            record(&[("symptom_description", json!("fever"))]),
            record(&[("severity", json!("mild"))]),
        ];
        let err = check_record_columns(TableName::Symptoms, &records).unwrap_err();
        match err {
            ChartXError::ColumnSetMismatch { record_index, .. } => assert_eq!(record_index, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_strip_null_records_drops_all_null_columns_and_rows() {
        let records = vec![
            record(&[("substance", json!("peanuts")), ("severity", json!(null))]),
            record(&[("substance", json!(null)), ("severity", json!(null))]),
            record(&[("substance", json!("latex")), ("severity", json!(null))]),
        ];
        let stripped = strip_null_records(records);
        assert_eq!(stripped.len(), 2);
        assert!(stripped.iter().all(|r| r.len() == 1));
    }

    #[test]
    fn test_explicit_null_matches_absent_key() {
        let records = vec![
            record(&[("substance", json!("peanuts"))]),
            record(&[("substance", json!("latex")), ("severity", json!(null))]),
        ];
        assert!(check_record_columns(TableName::Allergies, &records).is_ok());
    }

    #[test]
    fn test_null_in_one_record_is_a_mismatch() {
        let records = vec![
            record(&[("substance", json!("peanuts")), ("severity", json!("high"))]),
            record(&[("substance", json!("latex")), ("severity", json!(null))]),
        ];
        let err = check_record_columns(TableName::Allergies, &records).unwrap_err();
        assert!(matches!(err, ChartXError::ColumnSetMismatch { record_index: 1, .. }));
    }

    #[test]
    fn test_all_null_records_do_not_set_the_column_set() {
        let records = vec![
            record(&[("substance", json!(null)), ("severity", json!(null))]),
            record(&[("substance", json!("latex"))]),
            record(&[("substance", json!("dust"))]),
        ];
        assert!(check_record_columns(TableName::Allergies, &records).is_ok());
    }

    #[test]
    fn test_without_nulls() {
        let cols = record(&[("a", json!(1)), ("b", json!(null))]);
        assert_eq!(without_nulls(&cols).len(), 1);
    }
}
