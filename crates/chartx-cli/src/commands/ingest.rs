//! Ingest command
//!
//! Usage: chartx ingest [FILE]

use super::print_json;
use chartx_core::errors::{CxError, CxErrorKind};
use chartx_core::model::OperationResult;
use chartx_engine::{Engine, EngineSettings};
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Mapped-output JSON document
    #[arg(default_value = "mapped_output.json")]
    pub file: PathBuf,
}

/// Execute ingest
///
/// The result object goes to stdout either way; a failed reconcile also
/// returns the error so the process exits non-zero.
pub fn execute(args: IngestArgs, settings: EngineSettings) -> Result<(), Box<dyn std::error::Error>> {
    let document = read_document(&args.file)?;
    let mut engine = Engine::new(settings);

    match engine.reconcile(&document) {
        Ok(result) => print_json(&result),
        Err(err) => {
            print_json(&OperationResult::failure(&err))?;
            Err(err.into())
        }
    }
}

fn read_document(path: &Path) -> Result<Value, CxError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CxError::new(CxErrorKind::Io)
            .with_op("read_document")
            .with_message(format!("{}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        CxError::new(CxErrorKind::InvalidInput)
            .with_op("read_document")
            .with_message(format!("{} is not valid JSON: {}", path.display(), e))
    })
}
