// Integration tests for the migration framework

use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    // Given: An empty SQLite database
    let mut conn = setup_test_db();

    // When: Migrations are applied
    let result = chartx_store::migrations::apply_migrations(&mut conn);

    // Then: The patient schema exists
    assert!(result.is_ok(), "Migrations should succeed: {:?}", result.err());
    let tables = get_table_names(&conn);
    for expected in [
        "allergies",
        "medications",
        "patients",
        "schema_version",
        "sqlite_sequence",
        "surgeries",
        "symptoms",
    ] {
        assert!(tables.contains(&expected.to_string()), "missing {expected}");
    }
}

#[test]
fn test_email_is_unique() {
    let mut conn = setup_test_db();
    chartx_store::migrations::apply_migrations(&mut conn).unwrap();

    conn.execute("INSERT INTO patients (email) VALUES ('a@b.co')", [])
        .unwrap();
    let dup = conn.execute("INSERT INTO patients (email) VALUES ('a@b.co')", []);
    assert!(dup.is_err(), "Duplicate email must be rejected");
}

#[test]
fn test_dependents_cascade_with_patient() {
    let mut conn = setup_test_db();
    chartx_store::migrations::apply_migrations(&mut conn).unwrap();
    chartx_store::db::configure(&conn, 100).unwrap();

    conn.execute("INSERT INTO patients (email) VALUES ('a@b.co')", [])
        .unwrap();
    let pid = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO allergies (patient_id, substance) VALUES (?1, 'latex')",
        [pid],
    )
    .unwrap();

    conn.execute("DELETE FROM patients WHERE patient_id = ?1", [pid])
        .unwrap();
    let left: i64 = conn
        .query_row("SELECT COUNT(*) FROM allergies", [], |row| row.get(0))
        .unwrap();
    assert_eq!(left, 0);
}
