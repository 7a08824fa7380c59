//! Operation-state snapshot written before any mutation
//!
//! Lifecycle: saved after identity resolution, deleted on confirmed commit,
//! re-saved with `error` on failure, consumed once by the recovery executor.

use crate::errors::CxError;
use crate::model::operation::ColumnMap;
use crate::model::patient::PatientIdentity;
use crate::model::result::OperationRecord;
use chartx_core_types::OperationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationState {
    pub operation_id: OperationId,
    /// None when the operation was creating the patient
    #[serde(default)]
    pub patient_id: Option<i64>,
    pub email: String,
    /// `last_updated` of the patient row when the snapshot was taken
    #[serde(default)]
    pub last_update_snapshot: Option<DateTime<Utc>>,
    /// Pre-image of the patient row, or the submitted columns on creation
    pub original_data: ColumnMap,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub last_successful_operation: Option<OperationRecord>,
    pub created_at: DateTime<Utc>,
}

impl OperationState {
    /// Snapshot for a call that will create the patient
    pub fn for_creation(operation_id: OperationId, email: &str, submitted: ColumnMap) -> Self {
        Self {
            operation_id,
            patient_id: None,
            email: email.to_string(),
            last_update_snapshot: None,
            original_data: submitted,
            error: None,
            error_code: None,
            last_successful_operation: None,
            created_at: Utc::now(),
        }
    }

    /// Snapshot for a call that will update an existing patient
    pub fn for_update(
        operation_id: OperationId,
        identity: &PatientIdentity,
        pre_image: ColumnMap,
    ) -> Self {
        Self {
            operation_id,
            patient_id: Some(identity.patient_id),
            email: identity.email.clone(),
            last_update_snapshot: Some(identity.last_updated),
            original_data: pre_image,
            error: None,
            error_code: None,
            last_successful_operation: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the failure that ended the operation
    pub fn record_failure(&mut self, err: &CxError, last_successful: Option<OperationRecord>) {
        self.error = Some(err.to_string());
        self.error_code = Some(err.code().to_string());
        self.last_successful_operation = last_successful;
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Row and `last_updated` stamp (unix ms) to restore against, if any
    pub fn restore_point(&self) -> Option<(i64, i64)> {
        Some((
            self.patient_id?,
            self.last_update_snapshot?.timestamp_millis(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CxErrorKind;
    use crate::model::table::TableName;
    use chrono::TimeZone;
    use serde_json::json;

    fn identity() -> PatientIdentity {
        PatientIdentity {
            patient_id: 9,
            email: "jane@x.com".into(),
            last_updated: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
        }
    }

    #[test]
    fn test_creation_snapshot_is_not_restorable() {
        let state = OperationState::for_creation(OperationId::new(), "a@b.co", ColumnMap::new());
        assert!(state.patient_id.is_none());
        assert_eq!(state.restore_point(), None);
        assert!(!state.is_failed());
    }

    #[test]
    fn test_update_snapshot_carries_stamp() {
        let mut pre = ColumnMap::new();
        pre.insert("full_name".into(), json!("Jane Doe"));
        let state = OperationState::for_update(OperationId::new(), &identity(), pre);
        assert_eq!(state.patient_id, Some(9));
        assert_eq!(state.last_update_snapshot, Some(identity().last_updated));
        assert_eq!(state.restore_point(), Some((9, identity().stamp())));
    }

    #[test]
    fn test_record_failure_populates_error_fields() {
        let mut state = OperationState::for_update(OperationId::new(), &identity(), ColumnMap::new());
        let err = CxError::new(CxErrorKind::Verification).with_message("row missing");
        let last = OperationRecord::Update {
            table: TableName::Patients,
            id: 9,
        };
        state.record_failure(&err, Some(last.clone()));

        assert!(state.is_failed());
        assert_eq!(state.error_code.as_deref(), Some("ERR_VERIFICATION"));
        assert_eq!(state.last_successful_operation, Some(last));
    }

    #[test]
    fn test_state_json_roundtrip_preserves_millisecond_stamp() {
        let state = OperationState::for_update(OperationId::new(), &identity(), ColumnMap::new());
        let text = serde_json::to_string(&state).unwrap();
        let back: OperationState = serde_json::from_str(&text).unwrap();
        assert_eq!(back, state);
    }
}
