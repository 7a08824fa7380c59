//! ChartX Core - patient reconciliation kernel
//!
//! This crate holds everything that does not touch storage:
//! - Error facility (`CxError`, `CxErrorKind`) and domain errors (`ChartXError`)
//! - Logging facility (subscriber setup, operation boundary macros, test capture)
//! - Table Operation Model and document parsing
//! - Result, state, and patient model types
//! - Medical-term validation seam
//! - Document rules (column checks, null stripping, date normalisation)

pub mod document;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod policy;
pub mod rules;

// Re-export commonly used types
pub use document::parse_document;
pub use errors::{ChartXError, CxError, CxErrorKind, Result};
pub use model::{
    ColumnMap, OperationPayload, OperationRecord, OperationResult, OperationState,
    PatientIdentity, PatientRecord, RecoveryOutcome, TableName, TableOperation,
    TableOperationDocument,
};
pub use policy::{AcceptAllTerms, TermCategory, TermValidator, VocabularyTermValidator};
