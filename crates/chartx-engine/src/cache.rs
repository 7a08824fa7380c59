//! Caller-owned patient summary cache
//!
//! Keyed by email. Never consulted for identity resolution; it only serves
//! read-side summaries and is invalidated whenever a write touches the patient.

use chartx_core::model::PatientRecord;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PatientCache {
    entries: HashMap<String, PatientRecord>,
}

impl PatientCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, email: &str) -> Option<&PatientRecord> {
        self.entries.get(email)
    }

    pub fn insert(&mut self, email: impl Into<String>, record: PatientRecord) {
        self.entries.insert(email.into(), record);
    }

    /// Drop the entry for one email
    pub fn invalidate(&mut self, email: &str) -> bool {
        self.entries.remove(email).is_some()
    }

    /// Drop every entry for one patient id
    pub fn invalidate_patient(&mut self, patient_id: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, record| record.patient_id != patient_id);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
