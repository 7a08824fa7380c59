use chartx_core::policy::AcceptAllTerms;
use chartx_engine::{Engine, EngineSettings};
use rusqlite::Connection;
use tempfile::TempDir;

/// Engine over a scratch directory, with the term check disabled
#[allow(dead_code)]
pub fn setup_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::new(EngineSettings::in_dir(temp_dir.path())).with_validator(AcceptAllTerms);
    (temp_dir, engine)
}

/// Side connection to the engine's database, for seeding and inspection
#[allow(dead_code)]
pub fn side_connection(engine: &Engine) -> Connection {
    engine.connect().unwrap()
}

#[allow(dead_code)]
pub fn count_rows(conn: &Connection, table: &str, patient_id: i64) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE patient_id = ?1"),
        [patient_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn patient_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))
        .unwrap()
}
