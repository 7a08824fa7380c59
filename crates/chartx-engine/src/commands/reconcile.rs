//! Reconcile orchestration
//!
//! ## Pipeline (in order):
//! 1. The caller parses the document (input errors, no connection yet)
//! 2. Begin an immediate transaction and resolve identity
//! 3. Medical-term check (validation errors, nothing written)
//! 4. Read the pre-image and save the operation snapshot
//! 5. Apply writes, then verify them
//! 6. Commit and delete the snapshot
//!
//! A failure in step 5 or 6 rolls back, re-saves the snapshot with the
//! error attached, and returns the error carrying the operation id.

#![allow(clippy::result_large_err)]

use chartx_core::errors::CxError;
use chartx_core::model::{
    OperationResult, OperationState, PatientIdentity, TableOperationDocument,
};
use chartx_core::policy::{check_medical_terms, TermValidator};
use chartx_core::{log_op_end, log_op_error, log_op_start};
use chartx_core_types::{OperationId, Sensitive};
use chartx_store::db;
use chartx_store::errors::{from_rusqlite, Result};
use chartx_store::repo::{identity, read, upsert, verify, AppliedWrite};
use chartx_store::StateStore;
use rusqlite::{Connection, Transaction};
use std::time::Instant;

/// Points a reconcile call passes through; logged as it moves between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    Start,
    IdentityResolved,
    StateSnapshotSaved,
    WritesApplied,
    Verified,
    Committed,
    StateDeleted,
    Failed,
    StateRetained,
}

impl ReconcileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileState::Start => "START",
            ReconcileState::IdentityResolved => "IDENTITY_RESOLVED",
            ReconcileState::StateSnapshotSaved => "STATE_SNAPSHOT_SAVED",
            ReconcileState::WritesApplied => "WRITES_APPLIED",
            ReconcileState::Verified => "VERIFIED",
            ReconcileState::Committed => "COMMITTED",
            ReconcileState::StateDeleted => "STATE_DELETED",
            ReconcileState::Failed => "FAILED",
            ReconcileState::StateRetained => "STATE_RETAINED",
        }
    }
}

fn transition(operation_id: OperationId, state: ReconcileState) {
    tracing::debug!(
        operation_id = %operation_id,
        state = state.as_str(),
        "Reconcile transition"
    );
}

/// Reconcile a parsed document as one atomic unit
///
/// # Errors
/// - `Validation`: the term validator refused the document; nothing written,
///   no snapshot left
/// - `Database` / `Verification`: rolled back; the snapshot is retained with
///   the error and the returned error carries its operation id
/// - `Io` / `Serialization`: the snapshot could not be written; rolled back
pub fn reconcile_document(
    doc: &TableOperationDocument,
    conn: &mut Connection,
    state_store: &dyn StateStore,
    validator: &dyn TermValidator,
) -> Result<OperationResult> {
    let start = Instant::now();
    let operation_id = OperationId::new();
    log_op_start!(
        "reconcile",
        operation_id = %operation_id,
        email = %Sensitive::new(doc.email()),
        operation_count = doc.dependents().len() + 1
    );
    transition(operation_id, ReconcileState::Start);

    let result = run(operation_id, doc, conn, state_store, validator);
    let duration_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(outcome) => log_op_end!(
            "reconcile",
            duration_ms = duration_ms,
            operation_id = %operation_id,
            patient_id = outcome.patient_id
        ),
        Err(err) => log_op_error!(
            "reconcile",
            err,
            duration_ms = duration_ms,
            operation_id = %operation_id
        ),
    }
    result
}

fn run(
    operation_id: OperationId,
    doc: &TableOperationDocument,
    conn: &mut Connection,
    state_store: &dyn StateStore,
    validator: &dyn TermValidator,
) -> Result<OperationResult> {
    let tx = db::begin_immediate(conn)?;

    let existing = identity::resolve(&tx, doc.email())?;
    transition(operation_id, ReconcileState::IdentityResolved);

    check_medical_terms(doc, validator).map_err(CxError::from)?;

    let mut state = match &existing {
        Some(identity) => {
            let pre_image = read::read_patient_row(&tx, identity.patient_id)?.unwrap_or_default();
            OperationState::for_update(operation_id, identity, pre_image)
        }
        None => OperationState::for_creation(
            operation_id,
            doc.email(),
            doc.patient_columns().clone(),
        ),
    };
    state_store.save(&state)?;
    transition(operation_id, ReconcileState::StateSnapshotSaved);

    let mut writes = Vec::new();
    let committed = write_and_commit(operation_id, tx, doc, existing.as_ref(), &mut writes);

    match committed {
        Ok(patient_id) => {
            if let Err(err) = state_store.delete(operation_id) {
                tracing::warn!(
                    operation_id = %operation_id,
                    error = %err,
                    "Committed but could not delete operation state"
                );
            } else {
                transition(operation_id, ReconcileState::StateDeleted);
            }
            Ok(OperationResult::success(
                patient_id,
                writes.iter().map(AppliedWrite::record).collect(),
                operation_id,
            ))
        }
        Err(err) => {
            transition(operation_id, ReconcileState::Failed);
            let mut err = err.with_operation_id(operation_id);
            if let Some(patient_id) = existing.as_ref().map(|i| i.patient_id) {
                err = err.with_patient_id(patient_id);
            }

            state.record_failure(&err, writes.last().map(AppliedWrite::record));
            match state_store.save(&state) {
                Ok(()) => transition(operation_id, ReconcileState::StateRetained),
                Err(save_err) => tracing::error!(
                    operation_id = %operation_id,
                    error = %save_err,
                    "Could not record failure in operation state"
                ),
            }
            Err(err)
        }
    }
}

/// Apply, verify, and commit; the transaction is rolled back on any error
fn write_and_commit(
    operation_id: OperationId,
    tx: Transaction<'_>,
    doc: &TableOperationDocument,
    existing: Option<&PatientIdentity>,
    writes: &mut Vec<AppliedWrite>,
) -> Result<i64> {
    let applied = apply_and_verify(operation_id, &tx, doc, existing, writes);

    match applied {
        Ok(patient_id) => {
            tx.commit().map_err(from_rusqlite)?;
            transition(operation_id, ReconcileState::Committed);
            Ok(patient_id)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(
                    operation_id = %operation_id,
                    error = %rollback_err,
                    "Rollback failed"
                );
            }
            Err(err)
        }
    }
}

fn apply_and_verify(
    operation_id: OperationId,
    tx: &Transaction<'_>,
    doc: &TableOperationDocument,
    existing: Option<&PatientIdentity>,
    writes: &mut Vec<AppliedWrite>,
) -> Result<i64> {
    let patient_id = upsert::apply_into(tx, doc, existing, db::now_ms(), writes)?;
    transition(operation_id, ReconcileState::WritesApplied);

    verify::verify(tx, writes)?;
    transition(operation_id, ReconcileState::Verified);

    Ok(patient_id)
}
