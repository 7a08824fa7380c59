pub mod operation;
pub mod patient;
pub mod result;
pub mod state;
pub mod table;

pub use operation::{ColumnMap, OperationPayload, TableOperation, TableOperationDocument};
pub use patient::{PatientIdentity, PatientRecord};
pub use result::{ErrorSummary, OperationRecord, OperationResult, OperationStatus, RecoveryOutcome};
pub use state::OperationState;
pub use table::{primary_key_for, TableName};
