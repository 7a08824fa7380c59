pub mod ingest;
pub mod migrate;
pub mod pending;
pub mod recover;
pub mod show;

/// Print a value as pretty JSON on stdout
pub(crate) fn print_json<T: serde::Serialize>(
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
