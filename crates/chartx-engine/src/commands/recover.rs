//! Recovery of retained operation snapshots
//!
//! Restores a patient row to its pre-image, but only when nothing has written
//! the row since the snapshot was taken.

#![allow(clippy::result_large_err)]

use chartx_core::model::{OperationState, RecoveryOutcome};
use chartx_core::{log_op_end, log_op_error, log_op_start};
use chartx_core_types::OperationId;
use chartx_store::db;
use chartx_store::errors::{from_rusqlite, Result};
use chartx_store::repo::{identity, upsert, verify};
use chartx_store::StateStore;
use rusqlite::Connection;
use std::time::Instant;

/// Recover one retained operation
///
/// The snapshot is consumed: it is deleted after the attempt whatever the
/// outcome, unless it could not be read at all.
pub fn recover(
    operation_id: OperationId,
    conn: &mut Connection,
    state_store: &dyn StateStore,
) -> RecoveryOutcome {
    let start = Instant::now();
    log_op_start!("recover", operation_id = %operation_id);

    let result = state_store.load(operation_id).map(|loaded| match loaded {
        None => Ok(RecoveryOutcome::InsufficientData),
        Some(state) => {
            let restored = restore(&state, conn);
            if let Err(err) = state_store.delete(operation_id) {
                tracing::warn!(
                    operation_id = %operation_id,
                    error = %err,
                    "Could not delete operation state after recovery"
                );
            }
            restored
        }
    });
    let duration_ms = start.elapsed().as_millis() as u64;

    match result.and_then(|restored| restored) {
        Ok(outcome) => {
            log_op_end!(
                "recover",
                duration_ms = duration_ms,
                operation_id = %operation_id,
                outcome = ?outcome
            );
            outcome
        }
        Err(err) => {
            log_op_error!(
                "recover",
                err,
                duration_ms = duration_ms,
                operation_id = %operation_id
            );
            RecoveryOutcome::Error {
                code: err.code().to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Re-apply the pre-image if the row still carries the snapshot stamp
fn restore(state: &OperationState, conn: &mut Connection) -> Result<RecoveryOutcome> {
    let Some((patient_id, snapshot_stamp)) = state.restore_point() else {
        tracing::debug!(operation_id = %state.operation_id, "Snapshot has nothing to restore against");
        return Ok(RecoveryOutcome::InsufficientData);
    };

    let tx = db::begin_immediate(conn)?;

    let current = identity::current_stamp(&tx, patient_id)?;
    match current {
        Some(stamp) if stamp == snapshot_stamp => {}
        _ => {
            tracing::info!(
                operation_id = %state.operation_id,
                patient_id,
                "Patient changed since snapshot; not restoring"
            );
            return Ok(RecoveryOutcome::Stale { patient_id });
        }
    }

    let write = upsert::update_patient(
        &tx,
        patient_id,
        &state.original_data,
        upsert::next_stamp(snapshot_stamp, db::now_ms()),
    )?;
    verify::verify_one(&tx, &write)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(operation_id = %state.operation_id, patient_id, "Restored pre-image");
    Ok(RecoveryOutcome::Recovered { patient_id })
}
