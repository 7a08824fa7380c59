use crate::model::operation::ColumnMap;
use crate::model::table::TableName;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved identity of an existing patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientIdentity {
    pub patient_id: i64,
    pub email: String,
    pub last_updated: DateTime<Utc>,
}

impl PatientIdentity {
    /// Build from the stored millisecond stamp
    pub fn from_stamp(patient_id: i64, email: String, last_updated_ms: i64) -> Self {
        Self {
            patient_id,
            email,
            last_updated: stamp_to_datetime(last_updated_ms),
        }
    }

    /// Stored form of `last_updated`
    pub fn stamp(&self) -> i64 {
        self.last_updated.timestamp_millis()
    }
}

/// Convert a stored unix-millisecond stamp; out-of-range values clamp to the epoch
pub fn stamp_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// A patient row together with every dependent set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: i64,
    pub patient: ColumnMap,
    pub dependents: BTreeMap<TableName, Vec<ColumnMap>>,
}

impl PatientRecord {
    /// Number of rows held in one dependent table
    pub fn count(&self, table: TableName) -> usize {
        self.dependents.get(&table).map(Vec::len).unwrap_or(0)
    }
}
