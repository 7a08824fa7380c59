//! Medical-term validation seam
//!
//! The engine consults a [`TermValidator`] before it writes anything. The
//! validator sees the free-text terms of one category at a time and answers
//! yes or no; a "no" aborts the whole reconcile call.

use crate::errors::{ChartXError, Result};
use crate::model::operation::{ColumnMap, OperationPayload, TableOperationDocument};
use crate::model::table::TableName;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Category of a checked term, tied to the column it is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermCategory {
    Symptom,
    Medication,
    Allergy,
}

impl TermCategory {
    pub const ALL: [TermCategory; 3] = [
        TermCategory::Symptom,
        TermCategory::Medication,
        TermCategory::Allergy,
    ];

    pub fn table(&self) -> TableName {
        match self {
            TermCategory::Symptom => TableName::Symptoms,
            TermCategory::Medication => TableName::Medications,
            TermCategory::Allergy => TableName::Allergies,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            TermCategory::Symptom => "symptom_description",
            TermCategory::Medication => "medication_name",
            TermCategory::Allergy => "substance",
        }
    }
}

impl fmt::Display for TermCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table())
    }
}

/// Decides whether the terms of one category are plausible medical terms
pub trait TermValidator: Send + Sync {
    fn validate(&self, terms: &[String], category: TermCategory) -> bool;
}

impl<F> TermValidator for F
where
    F: Fn(&[String], TermCategory) -> bool + Send + Sync,
{
    fn validate(&self, terms: &[String], category: TermCategory) -> bool {
        self(terms, category)
    }
}

/// Validator that accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllTerms;

impl TermValidator for AcceptAllTerms {
    fn validate(&self, _terms: &[String], _category: TermCategory) -> bool {
        true
    }
}

/// Phrases too vague to record as a clinical term
const VAGUE_PHRASES: [&str; 6] = [
    "not feeling well",
    "feeling unwell",
    "unknown",
    "n/a",
    "none",
    "something",
];

/// Rule-based validator
///
/// Rejects blank terms, terms without a single letter, and known vague
/// phrases. With an allow-list configured for a category, every term of that
/// category must appear in it (case-insensitive).
///
/// # Example
/// ```
/// use chartx_core::policy::{TermCategory, TermValidator, VocabularyTermValidator};
///
/// let validator = VocabularyTermValidator::new()
///     .with_vocabulary(TermCategory::Medication, ["Metformin", "Lisinopril"]);
///
/// assert!(validator.validate(&["metformin".to_string()], TermCategory::Medication));
/// assert!(!validator.validate(&["aspirin".to_string()], TermCategory::Medication));
/// assert!(validator.validate(&["headache".to_string()], TermCategory::Symptom));
/// ```
#[derive(Debug, Clone, Default)]
pub struct VocabularyTermValidator {
    vocabularies: BTreeMap<TermCategory, BTreeSet<String>>,
}

impl VocabularyTermValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict a category to a fixed vocabulary
    pub fn with_vocabulary<I, S>(mut self, category: TermCategory, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.vocabularies.insert(
            category,
            terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .collect(),
        );
        self
    }

    fn term_ok(&self, term: &str, category: TermCategory) -> bool {
        let normalized = term.trim().to_lowercase();
        if normalized.is_empty() || !normalized.chars().any(char::is_alphabetic) {
            return false;
        }
        if VAGUE_PHRASES.contains(&normalized.as_str()) {
            return false;
        }
        self.vocabularies
            .get(&category)
            .map_or(true, |vocab| vocab.contains(&normalized))
    }
}

impl TermValidator for VocabularyTermValidator {
    fn validate(&self, terms: &[String], category: TermCategory) -> bool {
        terms.iter().all(|term| self.term_ok(term, category))
    }
}

/// Collect the terms of one category from a document
///
/// Null values are ignored; non-string values are checked in their JSON form.
pub fn collect_terms(doc: &TableOperationDocument, category: TermCategory) -> Vec<String> {
    let Some(op) = doc.dependent(category.table()) else {
        return Vec::new();
    };
    let term_of = |row: &ColumnMap| match row.get(category.column()) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };
    match &op.payload {
        OperationPayload::Columns(columns) => term_of(columns).into_iter().collect(),
        OperationPayload::Records(records) => records.iter().filter_map(term_of).collect(),
    }
}

/// Run the validator over every term category of a document
///
/// # Errors
/// Returns `TermRejected` for the first category the validator refuses.
pub fn check_medical_terms(
    doc: &TableOperationDocument,
    validator: &dyn TermValidator,
) -> Result<()> {
    for category in TermCategory::ALL {
        let terms = collect_terms(doc, category);
        if terms.is_empty() {
            continue;
        }
        if !validator.validate(&terms, category) {
            tracing::debug!(category = %category, count = terms.len(), "Term check refused");
            return Err(ChartXError::TermRejected {
                category: category.to_string(),
                terms,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use serde_json::json;

    fn doc() -> TableOperationDocument {
        parse_document(&json!([
            {"table": "patients", "columns": {"email": "a@b.co"}},
            {"table": "symptoms", "records": [
                {"symptom_description": "cough"},
                {"symptom_description": "not feeling well"}
            ]},
            {"table": "medications", "columns": {"medication_name": "Ibuprofen"}}
        ]))
        .unwrap()
    }

    #[test]
    fn test_collect_terms_reads_both_payload_modes() {
        let d = doc();
        assert_eq!(collect_terms(&d, TermCategory::Symptom).len(), 2);
        assert_eq!(collect_terms(&d, TermCategory::Medication), vec!["Ibuprofen"]);
        assert!(collect_terms(&d, TermCategory::Allergy).is_empty());
    }

    #[test]
    fn test_vocabulary_validator_rejects_vague_symptom() {
        let err = check_medical_terms(&doc(), &VocabularyTermValidator::new()).unwrap_err();
        match err {
            ChartXError::TermRejected { category, terms } => {
                assert_eq!(category, "symptoms");
                assert_eq!(terms.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_accept_all_and_closure_validators() {
        assert!(check_medical_terms(&doc(), &AcceptAllTerms).is_ok());

        let only_meds = |_: &[String], category: TermCategory| category != TermCategory::Medication;
        assert!(check_medical_terms(&doc(), &only_meds).is_err());
    }

    #[test]
    fn test_digits_only_term_rejected() {
        let v = VocabularyTermValidator::new();
        assert!(!v.validate(&["1234".into()], TermCategory::Allergy));
        assert!(!v.validate(&["   ".into()], TermCategory::Allergy));
        assert!(v.validate(&["Penicillin".into()], TermCategory::Allergy));
    }
}
