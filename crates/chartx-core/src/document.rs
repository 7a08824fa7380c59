//! Table Operation Document parsing
//!
//! Turns caller JSON into a [`TableOperationDocument`]. Every input check
//! happens here, so a rejected document never reaches the store.

use crate::errors::{ChartXError, Result};
use crate::model::operation::{
    ColumnMap, OperationPayload, TableOperation, TableOperationDocument,
};
use crate::model::table::TableName;
use crate::rules::{dates, validation};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Parse and validate a Table Operation Document
///
/// A single object is read as a one-element array. Elements that are not
/// objects, have no `table`, or carry neither `columns` nor `records` are
/// skipped with a warning, unless they name `patients`.
///
/// # Errors
/// Returns an input error (see [`ChartXError`]) for a document that cannot
/// be written as a unit.
pub fn parse_document(value: &Value) -> Result<TableOperationDocument> {
    let elements: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        other => {
            return Err(ChartXError::InvalidDocument {
                found: json_type_name(other).to_string(),
            })
        }
    };

    let mut seen = BTreeSet::new();
    let mut patient_columns: Option<ColumnMap> = None;
    let mut dependents = Vec::new();

    for (index, element) in elements.into_iter().enumerate() {
        let Some(op) = parse_element(index, element)? else {
            continue;
        };

        if !seen.insert(op.table) {
            return Err(if op.table == TableName::Patients {
                ChartXError::DuplicatePatientsEntry
            } else {
                ChartXError::DuplicateTable {
                    table: op.table.to_string(),
                }
            });
        }

        match (op.table, op.payload) {
            (TableName::Patients, OperationPayload::Columns(columns)) => {
                patient_columns = Some(columns);
            }
            (TableName::Patients, OperationPayload::Records(_)) => {
                return Err(ChartXError::PatientsRequiresColumns);
            }
            (table, payload) => dependents.push(TableOperation { table, payload }),
        }
    }

    let mut patient_columns = patient_columns.ok_or(ChartXError::MissingPatientsEntry)?;
    let email = match patient_columns.get("email") {
        Some(Value::String(raw)) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => return Err(ChartXError::MissingEmail),
    };
    patient_columns.insert("email".to_string(), Value::String(email.clone()));

    Ok(TableOperationDocument::new(
        email,
        patient_columns,
        dependents,
    ))
}

/// Parse one element; `Ok(None)` means skip
fn parse_element(index: usize, element: &Value) -> Result<Option<TableOperation>> {
    let Some(object) = element.as_object() else {
        tracing::warn!(index, "Skipping document element that is not an object");
        return Ok(None);
    };

    let table_name = match object.get("table").and_then(Value::as_str).map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => {
            tracing::warn!(index, "Skipping document element without a table name");
            return Ok(None);
        }
    };

    let columns = object.get("columns");
    let records = object.get("records");

    if columns.is_some() && records.is_some() {
        return Err(ChartXError::MixedPayload {
            table: table_name.to_string(),
        });
    }
    if columns.is_none() && records.is_none() {
        if table_name == TableName::Patients.as_str() {
            return Err(ChartXError::PatientsRequiresColumns);
        }
        tracing::warn!(
            index,
            table = table_name,
            "Skipping document element with neither columns nor records"
        );
        return Ok(None);
    }

    let table: TableName = table_name
        .parse()
        .map_err(|table| ChartXError::UnsupportedTable { table })?;

    let op = match (columns, records) {
        (Some(columns), _) => TableOperation::columns(table, parse_columns(table, columns)?),
        (None, Some(records)) => TableOperation::records(table, parse_records(table, records)?),
        (None, None) => return Ok(None),
    };
    Ok(Some(op))
}

fn parse_columns(table: TableName, value: &Value) -> Result<ColumnMap> {
    let object = value.as_object().ok_or_else(|| ChartXError::InvalidPayload {
        table: table.to_string(),
        reason: format!("'columns' must be an object, got {}", json_type_name(value)),
    })?;
    normalize_map(table, object)
}

fn parse_records(table: TableName, value: &Value) -> Result<Vec<ColumnMap>> {
    let items = value.as_array().ok_or_else(|| ChartXError::InvalidPayload {
        table: table.to_string(),
        reason: format!("'records' must be an array, got {}", json_type_name(value)),
    })?;

    let records = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let object = item.as_object().ok_or_else(|| ChartXError::InvalidPayload {
                table: table.to_string(),
                reason: format!("record {i} must be an object, got {}", json_type_name(item)),
            })?;
            normalize_map(table, object)
        })
        .collect::<Result<Vec<_>>>()?;

    validation::check_record_columns(table, &records)?;
    let before = records.len();
    let records = validation::strip_null_records(records);
    if records.len() != before {
        tracing::debug!(
            table = %table,
            dropped = before - records.len(),
            "Discarded records with no non-null value"
        );
    }
    Ok(records)
}

fn normalize_map(table: TableName, object: &Map<String, Value>) -> Result<ColumnMap> {
    let mut columns: ColumnMap = object
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    validation::strip_engine_owned(table, &mut columns);
    validation::validate_columns(table, &columns)?;
    dates::normalize_date_columns(&mut columns);
    Ok(columns)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
