use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary-key column for a table name
///
/// The mapping is fixed. Tables outside the patient schema (appointments,
/// doctors) are listed because single-row lookups against them use the same
/// naming rule; anything unknown falls back to `id`.
pub fn primary_key_for(table: &str) -> &'static str {
    match table {
        "patients" => "patient_id",
        "symptoms" => "symptom_id",
        "medications" => "medication_id",
        "allergies" => "allergy_id",
        "surgeries" => "surgery_id",
        "appointments" => "appointment_id",
        "doctors" => "doctor_id",
        _ => "id",
    }
}

/// Tables the engine writes
///
/// `Patients` is the parent; the rest are one-to-many children keyed by
/// `patient_id`. Table identifiers in SQL only ever come from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Patients,
    Symptoms,
    Medications,
    Allergies,
    Surgeries,
}

impl TableName {
    /// Dependent tables in schema order
    pub const DEPENDENTS: [TableName; 4] = [
        TableName::Symptoms,
        TableName::Medications,
        TableName::Allergies,
        TableName::Surgeries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Patients => "patients",
            TableName::Symptoms => "symptoms",
            TableName::Medications => "medications",
            TableName::Allergies => "allergies",
            TableName::Surgeries => "surgeries",
        }
    }

    pub fn primary_key(&self) -> &'static str {
        primary_key_for(self.as_str())
    }

    pub fn is_dependent(&self) -> bool {
        !matches!(self, TableName::Patients)
    }
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "patients" => Ok(TableName::Patients),
            "symptoms" => Ok(TableName::Symptoms),
            "medications" => Ok(TableName::Medications),
            "allergies" => Ok(TableName::Allergies),
            "surgeries" => Ok(TableName::Surgeries),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
