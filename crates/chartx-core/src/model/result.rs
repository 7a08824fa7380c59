use crate::errors::CxError;
use crate::model::table::TableName;
use chartx_core_types::OperationId;
use serde::{Deserialize, Serialize};

/// One write reported back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationRecord {
    /// A row was inserted; `id` is its generated primary key
    Single { table: TableName, id: i64 },
    /// The existing patient row was updated
    Update { table: TableName, id: i64 },
    /// A dependent set was replaced with `count` rows
    Multiple { table: TableName, count: usize },
}

impl OperationRecord {
    pub fn table(&self) -> TableName {
        match self {
            OperationRecord::Single { table, .. }
            | OperationRecord::Update { table, .. }
            | OperationRecord::Multiple { table, .. } => *table,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Success,
    Error,
}

/// Code and message of a failed call, as shown to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub code: String,
    pub message: String,
}

impl From<&CxError> for ErrorSummary {
    fn from(err: &CxError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result object of a reconcile call
///
/// On failure `operation_id` is set only when a state snapshot was retained
/// for the recovery executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub status: OperationStatus,
    pub patient_id: Option<i64>,
    pub operations: Vec<OperationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<OperationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
}

impl OperationResult {
    pub fn success(
        patient_id: i64,
        operations: Vec<OperationRecord>,
        operation_id: OperationId,
    ) -> Self {
        Self {
            status: OperationStatus::Success,
            patient_id: Some(patient_id),
            operations,
            operation_id: Some(operation_id),
            error: None,
        }
    }

    pub fn failure(err: &CxError) -> Self {
        let operation_id = err
            .operation_id()
            .filter(|_| err.kind().retains_state());
        Self {
            status: OperationStatus::Error,
            patient_id: err.patient_id(),
            operations: Vec::new(),
            operation_id,
            error: Some(ErrorSummary::from(err)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }
}

/// Outcome of one recovery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecoveryOutcome {
    /// The pre-image was re-applied
    Recovered { patient_id: i64 },
    /// Another writer moved the row since the failure; nothing was written
    Stale { patient_id: i64 },
    /// No snapshot, or the snapshot has no row to restore
    InsufficientData,
    /// The attempt itself failed
    Error { code: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CxErrorKind;
    use serde_json::json;

    #[test]
    fn test_operation_record_shapes() {
        let single = OperationRecord::Single {
            table: TableName::Patients,
            id: 1,
        };
        let multiple = OperationRecord::Multiple {
            table: TableName::Symptoms,
            count: 2,
        };
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            json!({"table": "patients", "type": "single", "id": 1})
        );
        assert_eq!(
            serde_json::to_value(&multiple).unwrap(),
            json!({"table": "symptoms", "type": "multiple", "count": 2})
        );
    }

    #[test]
    fn test_failure_keeps_operation_id_only_when_state_retained() {
        let op_id = OperationId::new();

        let db_err = CxError::new(CxErrorKind::Database).with_operation_id(op_id);
        let result = OperationResult::failure(&db_err);
        assert_eq!(result.status, OperationStatus::Error);
        assert_eq!(result.operation_id, Some(op_id));

        let input_err = CxError::new(CxErrorKind::InvalidInput).with_operation_id(op_id);
        assert_eq!(OperationResult::failure(&input_err).operation_id, None);
    }

    #[test]
    fn test_success_result_has_no_error_field() {
        let result = OperationResult::success(1, vec![], OperationId::new());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "success");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_recovery_outcome_tagging() {
        assert_eq!(
            serde_json::to_value(RecoveryOutcome::Stale { patient_id: 4 }).unwrap(),
            json!({"outcome": "stale", "patient_id": 4})
        );
        assert_eq!(
            serde_json::to_value(RecoveryOutcome::InsufficientData).unwrap(),
            json!({"outcome": "insufficient_data"})
        );
    }
}
