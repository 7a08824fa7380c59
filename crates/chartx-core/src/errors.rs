use chartx_core_types::OperationId;
use thiserror::Error;

/// Result type alias using ChartXError
pub type Result<T> = std::result::Result<T, ChartXError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Callers branch on the kind, never on message text. The first four kinds
/// partition every failure of a reconcile call:
///
/// - `InvalidInput`: the document was rejected before any database call
/// - `Validation`: the medical-term check refused the document before any write
/// - `Database`: the store failed mid-operation; the transaction was rolled back
/// - `Verification`: a write reported success but its row could not be read back
///
/// The remaining kinds cover the surrounding plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CxErrorKind {
    // Reconciliation
    InvalidInput,
    Validation,
    Database,
    Verification,

    // Lookup
    NotFound,

    // Integration/IO
    Io,
    Serialization,
    Config,

    // Internal
    Internal,
}

impl CxErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            CxErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            CxErrorKind::Validation => "ERR_VALIDATION",
            CxErrorKind::Database => "ERR_DATABASE",
            CxErrorKind::Verification => "ERR_VERIFICATION",
            CxErrorKind::NotFound => "ERR_NOT_FOUND",
            CxErrorKind::Io => "ERR_IO",
            CxErrorKind::Serialization => "ERR_SERIALIZATION",
            CxErrorKind::Config => "ERR_CONFIG",
            CxErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an error of this kind leaves a retained operation-state
    /// snapshot behind when it happens after the snapshot was saved
    pub fn retains_state(&self) -> bool {
        matches!(self, CxErrorKind::Database | CxErrorKind::Verification)
    }
}

/// Canonical structured error type
///
/// Carries the classification used for programmatic handling plus the
/// context needed to find the failed operation again (operation id, table,
/// patient id).
#[derive(Debug, Clone)]
pub struct CxError {
    kind: CxErrorKind,
    op: Option<String>,
    operation_id: Option<OperationId>,
    table: Option<String>,
    patient_id: Option<i64>,
    message: String,
    source: Option<Box<CxError>>,
}

impl CxError {
    /// Create a new error with the specified kind
    pub fn new(kind: CxErrorKind) -> Self {
        Self {
            kind,
            op: None,
            operation_id: None,
            table: None,
            patient_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the operation id of the reconcile call that failed
    pub fn with_operation_id(mut self, operation_id: OperationId) -> Self {
        self.operation_id = Some(operation_id);
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add patient id context
    pub fn with_patient_id(mut self, patient_id: i64) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: CxError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> CxErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the operation id, if the failure happened after one was minted
    pub fn operation_id(&self) -> Option<OperationId> {
        self.operation_id
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the patient id context, if any
    pub fn patient_id(&self) -> Option<i64> {
        self.patient_id
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&CxError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for CxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(patient_id) = self.patient_id {
            write!(f, " (patient_id: {})", patient_id)?;
        }
        if let Some(operation_id) = &self.operation_id {
            write!(f, " (operation_id: {})", operation_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for CxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised while reading and checking a Table Operation Document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartXError {
    // ===== Document shape =====
    /// Top-level JSON is neither an object nor an array
    #[error("Table operation document must be a JSON object or array, got {found}")]
    InvalidDocument { found: String },

    /// No `patients` element in the document
    #[error("Document has no 'patients' entry")]
    MissingPatientsEntry,

    /// More than one `patients` element in the document
    #[error("Document has more than one 'patients' entry")]
    DuplicatePatientsEntry,

    /// The `patients` element is not in single-row `columns` mode
    #[error("The 'patients' entry must carry 'columns'")]
    PatientsRequiresColumns,

    /// The `patients` element has no usable email
    #[error("The 'patients' entry has no non-empty 'email' column")]
    MissingEmail,

    /// An element carries both `columns` and `records`
    #[error("Entry for table '{table}' has both 'columns' and 'records'")]
    MixedPayload { table: String },

    /// `columns` or `records` has the wrong JSON type
    #[error("Entry for table '{table}' is malformed: {reason}")]
    InvalidPayload { table: String, reason: String },

    /// Table is not part of the fixed patient schema
    #[error("Table '{table}' is not supported")]
    UnsupportedTable { table: String },

    /// The same table appears in more than one element
    #[error("Table '{table}' appears more than once in the document")]
    DuplicateTable { table: String },

    /// Column name cannot be used as an identifier
    #[error("Invalid column name '{column}' for table '{table}'")]
    InvalidColumnName { table: String, column: String },

    /// A record's column set differs from the first record's
    #[error(
        "Record {record_index} of table '{table}' has columns {found:?}, expected {expected:?}"
    )]
    ColumnSetMismatch {
        table: String,
        record_index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    // ===== Validation =====
    /// The medical-term validator refused a set of terms
    #[error("Medical term check failed for {category}: {terms:?}")]
    TermRejected { category: String, terms: Vec<String> },
}

/// Conversion from ChartXError to CxError
impl From<ChartXError> for CxError {
    fn from(err: ChartXError) -> Self {
        let message = err.to_string();
        match err {
            ChartXError::InvalidDocument { .. }
            | ChartXError::MissingPatientsEntry
            | ChartXError::DuplicatePatientsEntry
            | ChartXError::PatientsRequiresColumns
            | ChartXError::MissingEmail => CxError::new(CxErrorKind::InvalidInput)
                .with_op("parse_document")
                .with_message(message),

            ChartXError::MixedPayload { table }
            | ChartXError::InvalidPayload { table, .. }
            | ChartXError::UnsupportedTable { table }
            | ChartXError::DuplicateTable { table }
            | ChartXError::InvalidColumnName { table, .. }
            | ChartXError::ColumnSetMismatch { table, .. } => {
                CxError::new(CxErrorKind::InvalidInput)
                    .with_op("parse_document")
                    .with_table(table)
                    .with_message(message)
            }

            ChartXError::TermRejected { category, .. } => CxError::new(CxErrorKind::Validation)
                .with_op("check_medical_terms")
                .with_table(category)
                .with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_error_kind_codes() {
        let cases = [
            (CxErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
            (CxErrorKind::Validation, "ERR_VALIDATION"),
            (CxErrorKind::Database, "ERR_DATABASE"),
            (CxErrorKind::Verification, "ERR_VERIFICATION"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_only_rollback_kinds_retain_state() {
        assert!(CxErrorKind::Database.retains_state());
        assert!(CxErrorKind::Verification.retains_state());
        assert!(!CxErrorKind::InvalidInput.retains_state());
        assert!(!CxErrorKind::Validation.retains_state());
    }

    #[test]
    fn test_display_includes_context() {
        let op_id = OperationId::new();
        let err = CxError::new(CxErrorKind::Database)
            .with_op("reconcile")
            .with_table("symptoms")
            .with_patient_id(3)
            .with_operation_id(op_id)
            .with_message("disk I/O error");
        let s = err.to_string();
        assert!(s.starts_with("[ERR_DATABASE] in operation 'reconcile': disk I/O error"));
        assert!(s.contains("(table: symptoms)"));
        assert!(s.contains("(patient_id: 3)"));
        assert!(s.contains(&op_id.to_string()));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        use std::error::Error;
        let inner = CxError::new(CxErrorKind::Io).with_message("rename failed");
        let outer = CxError::new(CxErrorKind::Database).with_source(inner);
        assert!(outer.source().is_some());
        assert_eq!(outer.source_error().unwrap().kind(), CxErrorKind::Io);
    }

    #[test]
    fn test_column_mismatch_maps_to_invalid_input_with_table() {
        let err: CxError = ChartXError::ColumnSetMismatch {
            table: "symptoms".into(),
            record_index: 1,
            expected: vec!["severity".into()],
            found: vec!["duration".into()],
        }
        .into();
        assert_eq!(err.kind(), CxErrorKind::InvalidInput);
        assert_eq!(err.table(), Some("symptoms"));
    }

    #[test]
    fn test_term_rejection_maps_to_validation() {
        let err: CxError = ChartXError::TermRejected {
            category: "medications".into(),
            terms: vec!["???".into()],
        }
        .into();
        assert_eq!(err.kind(), CxErrorKind::Validation);
        assert_eq!(err.code(), "ERR_VALIDATION");
    }

    #[test]
    fn test_domain_errors_never_retain_state() {
        let errors = [
            ChartXError::MissingEmail,
            ChartXError::DuplicateTable {
                table: "symptoms".into(),
            },
            ChartXError::TermRejected {
                category: "allergies".into(),
                terms: vec!["none".into()],
            },
        ];
        for err in errors {
            let cx: CxError = err.into();
            assert!(!cx.kind().retains_state(), "{cx} must not retain state");
        }
    }
}
