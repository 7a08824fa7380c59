// Tests for identity resolution, document writes, verification, and reads

use chartx_core::errors::CxErrorKind;
use chartx_core::model::TableName;
use chartx_core::parse_document;
use chartx_store::db;
use chartx_store::repo::{identity, read, upsert, verify, AppliedWrite};
use rusqlite::Connection;
use serde_json::{json, Value};
use tempfile::TempDir;

fn setup_test_env() -> (TempDir, Connection) {
    let temp_dir = TempDir::new().unwrap();
    let mut conn = db::open(temp_dir.path().join("store.db")).unwrap();
    db::configure(&conn, db::DEFAULT_BUSY_TIMEOUT_MS).unwrap();
    chartx_store::migrations::apply_migrations(&mut conn).unwrap();
    (temp_dir, conn)
}

fn write(conn: &mut Connection, doc: Value, now_ms: i64) -> Vec<AppliedWrite> {
    let doc = parse_document(&doc).unwrap();
    let tx = db::begin_immediate(conn).unwrap();
    let found = identity::resolve(&tx, doc.email()).unwrap();
    let writes = upsert::apply(&tx, &doc, found.as_ref(), now_ms).unwrap();
    verify::verify(&tx, &writes).unwrap();
    tx.commit().unwrap();
    writes
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn test_new_email_inserts_patient() {
    let (_temp_dir, mut conn) = setup_test_env();

    let writes = write(
        &mut conn,
        json!({"table": "patients", "columns": {"email": "jane@x.com", "full_name": "Jane", "phone": null}}),
        1_000,
    );

    assert_eq!(writes.len(), 1);
    assert!(matches!(writes[0], AppliedWrite::PatientInserted { stamp: 1_000, .. }));
    let identity = identity::resolve(&conn, "jane@x.com").unwrap().unwrap();
    assert_eq!(identity.stamp(), 1_000);
    assert_eq!(count(&conn, "patients"), 1);
}

#[test]
fn test_resolve_unknown_email_is_none() {
    let (_temp_dir, conn) = setup_test_env();
    assert!(identity::resolve(&conn, "nobody@x.com").unwrap().is_none());
}

#[test]
fn test_update_skips_nulls_and_bumps_stamp() {
    let (_temp_dir, mut conn) = setup_test_env();
    write(
        &mut conn,
        json!({"table": "patients", "columns": {"email": "jane@x.com", "full_name": "Jane", "phone": "555"}}),
        5_000,
    );

    // Same clock reading: stamp still moves forward
    let writes = write(
        &mut conn,
        json!({"table": "patients", "columns": {"email": "jane@x.com", "full_name": "Jane Doe", "phone": null}}),
        5_000,
    );

    assert!(matches!(writes[0], AppliedWrite::PatientUpdated { stamp: 5_001, .. }));
    let row = read::read_patient_row(&conn, 1).unwrap().unwrap();
    assert_eq!(row["full_name"], json!("Jane Doe"));
    assert_eq!(row["phone"], json!("555"));
    assert_eq!(count(&conn, "patients"), 1);
}

#[test]
fn test_records_replace_full_set() {
    let (_temp_dir, mut conn) = setup_test_env();
    write(
        &mut conn,
        json!([
            {"table": "patients", "columns": {"email": "jane@x.com"}},
            {"table": "symptoms", "records": [
                {"symptom_description": "cough"},
                {"symptom_description": "fever"},
                {"symptom_description": "headache"}
            ]}
        ]),
        1_000,
    );

    let writes = write(
        &mut conn,
        json!([
            {"table": "patients", "columns": {"email": "jane@x.com"}},
            {"table": "symptoms", "records": [{"symptom_description": "rash"}]}
        ]),
        2_000,
    );

    assert_eq!(
        writes[1],
        AppliedWrite::SetReplaced {
            table: TableName::Symptoms,
            patient_id: 1,
            count: 1
        }
    );
    let rows = read::read_dependents(&conn, TableName::Symptoms, 1).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["symptom_description"], json!("rash"));
}

#[test]
fn test_empty_records_leave_set_untouched() {
    let (_temp_dir, mut conn) = setup_test_env();
    write(
        &mut conn,
        json!([
            {"table": "patients", "columns": {"email": "jane@x.com"}},
            {"table": "allergies", "records": [{"substance": "latex"}]}
        ]),
        1_000,
    );

    let writes = write(
        &mut conn,
        json!([
            {"table": "patients", "columns": {"email": "jane@x.com"}},
            {"table": "allergies", "records": []}
        ]),
        2_000,
    );

    assert_eq!(writes.len(), 1);
    assert_eq!(count(&conn, "allergies"), 1);
}

#[test]
fn test_dependent_columns_append_single_row() {
    let (_temp_dir, mut conn) = setup_test_env();
    let writes = write(
        &mut conn,
        json!([
            {"table": "patients", "columns": {"email": "jane@x.com"}},
            {"table": "surgeries", "columns": {"procedure_name": "Appendectomy", "surgery_date": "02/01/2019"}}
        ]),
        1_000,
    );

    assert!(matches!(
        writes[1],
        AppliedWrite::RowInserted {
            table: TableName::Surgeries,
            ..
        }
    ));
    let rows = read::read_dependents(&conn, TableName::Surgeries, 1).unwrap();
    assert_eq!(rows[0]["surgery_date"], json!("2019-01-02"));
}

#[test]
fn test_verify_reports_stale_patient_stamp() {
    let (_temp_dir, mut conn) = setup_test_env();
    write(
        &mut conn,
        json!({"table": "patients", "columns": {"email": "jane@x.com"}}),
        1_000,
    );

    let err = verify::verify_one(
        &conn,
        &AppliedWrite::PatientUpdated {
            patient_id: 1,
            stamp: 9_999,
        },
    )
    .unwrap_err();
    assert_eq!(err.kind(), CxErrorKind::Verification);
    assert_eq!(err.table(), Some("patients"));
}

#[test]
fn test_verify_reports_count_mismatch() {
    let (_temp_dir, conn) = setup_test_env();
    let err = verify::verify_one(
        &conn,
        &AppliedWrite::SetReplaced {
            table: TableName::Medications,
            patient_id: 1,
            count: 2,
        },
    )
    .unwrap_err();
    assert_eq!(err.kind(), CxErrorKind::Verification);
}

#[test]
fn test_load_patient_record_collects_every_table() {
    let (_temp_dir, mut conn) = setup_test_env();
    write(
        &mut conn,
        json!([
            {"table": "patients", "columns": {"email": "jane@x.com", "age": 34}},
            {"table": "medications", "records": [
                {"medication_name": "Ibuprofen", "dosage": "200mg"},
                {"medication_name": "Metformin", "dosage": "500mg"}
            ]}
        ]),
        1_000,
    );

    let record = read::load_patient_record(&conn, "jane@x.com")
        .unwrap()
        .unwrap();
    assert_eq!(record.patient["age"], json!(34));
    assert_eq!(record.count(TableName::Medications), 2);
    assert_eq!(record.count(TableName::Symptoms), 0);
    assert!(read::load_patient_record(&conn, "other@x.com")
        .unwrap()
        .is_none());
}
