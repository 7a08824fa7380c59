//! In-memory representation of "what to write"
//!
//! Values here are storage independent. They are built by
//! [`crate::document::parse_document`], which enforces the document
//! invariants, so holders of a `TableOperationDocument` can rely on them.

use crate::model::table::TableName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column name to JSON value, sorted by column name
pub type ColumnMap = BTreeMap<String, serde_json::Value>;

/// Payload of one table operation
///
/// Serializes as `{"columns": {...}}` or `{"records": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationPayload {
    /// Single-row insert/update
    Columns(ColumnMap),
    /// Multi-row replace of the patient's full set
    Records(Vec<ColumnMap>),
}

/// One instruction of a Table Operation Document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOperation {
    pub table: TableName,
    #[serde(flatten)]
    pub payload: OperationPayload,
}

impl TableOperation {
    pub fn columns(table: TableName, columns: ColumnMap) -> Self {
        Self {
            table,
            payload: OperationPayload::Columns(columns),
        }
    }

    pub fn records(table: TableName, records: Vec<ColumnMap>) -> Self {
        Self {
            table,
            payload: OperationPayload::Records(records),
        }
    }

    /// True for a `records` operation with nothing in it
    pub fn is_noop(&self) -> bool {
        matches!(&self.payload, OperationPayload::Records(r) if r.is_empty())
    }
}

/// A validated unit of work
///
/// Always holds exactly one `patients` operation in `columns` mode with a
/// non-empty email; every other operation targets a dependent table, at most
/// once per table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOperationDocument {
    email: String,
    patient_columns: ColumnMap,
    dependents: Vec<TableOperation>,
}

impl TableOperationDocument {
    pub(crate) fn new(
        email: String,
        patient_columns: ColumnMap,
        dependents: Vec<TableOperation>,
    ) -> Self {
        Self {
            email,
            patient_columns,
            dependents,
        }
    }

    /// Natural key of the patient this document describes
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Columns submitted for the `patients` row, email included
    pub fn patient_columns(&self) -> &ColumnMap {
        &self.patient_columns
    }

    /// Dependent-table operations in document order
    pub fn dependents(&self) -> &[TableOperation] {
        &self.dependents
    }

    /// Look up the operation for one dependent table
    pub fn dependent(&self, table: TableName) -> Option<&TableOperation> {
        self.dependents.iter().find(|op| op.table == table)
    }

    /// All operations, `patients` first, as they would be written
    pub fn operations(&self) -> Vec<TableOperation> {
        std::iter::once(TableOperation::columns(
            TableName::Patients,
            self.patient_columns.clone(),
        ))
        .chain(self.dependents.iter().cloned())
        .collect()
    }
}
