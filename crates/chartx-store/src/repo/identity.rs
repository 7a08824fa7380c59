//! Identity Resolver
//!
//! Maps the natural key (email) to the surrogate key (`patient_id`).

#![allow(clippy::result_large_err)]

use crate::errors::{table_error, Result};
use chartx_core::model::PatientIdentity;
use chartx_core_types::Sensitive;
use rusqlite::{Connection, OptionalExtension};

/// Look up a patient by exact email match
///
/// Always reads the database. Returns `None` when no row carries the email.
pub fn resolve(conn: &Connection, email: &str) -> Result<Option<PatientIdentity>> {
    let row = conn
        .query_row(
            "SELECT patient_id, email, last_updated FROM patients WHERE email = ?1",
            [email],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )
        .optional()
        .map_err(|e| table_error("patients", e).with_op("resolve_identity"))?;

    let identity = row.map(|(patient_id, email, stamp)| {
        PatientIdentity::from_stamp(patient_id, email, stamp)
    });

    tracing::debug!(
        email = %Sensitive::new(email),
        patient_id = identity.as_ref().map(|i| i.patient_id),
        "Resolved identity"
    );
    Ok(identity)
}

/// Current `last_updated` stamp of a patient row, if the row exists
pub fn current_stamp(conn: &Connection, patient_id: i64) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT last_updated FROM patients WHERE patient_id = ?1",
        [patient_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| {
        table_error("patients", e)
            .with_op("read_stamp")
            .with_patient_id(patient_id)
    })
}
