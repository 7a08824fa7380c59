//! Show command
//!
//! Usage: chartx show <EMAIL>

use super::print_json;
use chartx_core::errors::{CxError, CxErrorKind};
use chartx_engine::{Engine, EngineSettings};
use clap::Args;

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub email: String,
}

pub fn execute(args: ShowArgs, settings: EngineSettings) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(settings);
    match engine.patient_record(&args.email)? {
        Some(record) => print_json(&record),
        None => Err(CxError::new(CxErrorKind::NotFound)
            .with_op("show")
            .with_message("no patient with that email")
            .into()),
    }
}
