//! Read side: pre-images and patient summaries

#![allow(clippy::result_large_err)]

use crate::errors::{table_error, Result};
use crate::repo::identity;
use crate::sqlvalue::{from_sql, quote_ident};
use chartx_core::model::{ColumnMap, PatientRecord, TableName};
use rusqlite::{Connection, Row};
use std::collections::BTreeMap;

/// The full patient row as stored, or `None` if it does not exist
pub fn read_patient_row(conn: &Connection, patient_id: i64) -> Result<Option<ColumnMap>> {
    let rows = read_rows(
        conn,
        TableName::Patients,
        "SELECT * FROM \"patients\" WHERE \"patient_id\" = ?1",
        patient_id,
    )?;
    Ok(rows.into_iter().next())
}

/// All rows of one dependent table for a patient, in insertion order
pub fn read_dependents(
    conn: &Connection,
    table: TableName,
    patient_id: i64,
) -> Result<Vec<ColumnMap>> {
    let sql = format!(
        "SELECT * FROM {} WHERE \"patient_id\" = ?1 ORDER BY {}",
        quote_ident(table.as_str()),
        quote_ident(table.primary_key())
    );
    read_rows(conn, table, &sql, patient_id)
}

/// Patient row plus every dependent set, looked up by email
pub fn load_patient_record(conn: &Connection, email: &str) -> Result<Option<PatientRecord>> {
    let Some(identity) = identity::resolve(conn, email)? else {
        return Ok(None);
    };
    let Some(patient) = read_patient_row(conn, identity.patient_id)? else {
        return Ok(None);
    };

    let mut dependents = BTreeMap::new();
    for table in TableName::DEPENDENTS {
        dependents.insert(table, read_dependents(conn, table, identity.patient_id)?);
    }

    Ok(Some(PatientRecord {
        patient_id: identity.patient_id,
        patient,
        dependents,
    }))
}

fn read_rows(
    conn: &Connection,
    table: TableName,
    sql: &str,
    patient_id: i64,
) -> Result<Vec<ColumnMap>> {
    let map_err = |e: rusqlite::Error| {
        table_error(table.as_str(), e)
            .with_op("read")
            .with_patient_id(patient_id)
    };
    let mut stmt = conn.prepare(sql).map_err(map_err)?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query_map([patient_id], |row| row_to_map(row, &names))
        .map_err(map_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(map_err)?;
    Ok(rows)
}

fn row_to_map(row: &Row<'_>, names: &[String]) -> rusqlite::Result<ColumnMap> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Ok((name.clone(), from_sql(row.get_ref(i)?))))
        .collect()
}
