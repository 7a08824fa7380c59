//! Recover command
//!
//! Usage: chartx recover <OPERATION_ID>

use super::print_json;
use chartx_core::model::RecoveryOutcome;
use chartx_core_types::OperationId;
use chartx_engine::{Engine, EngineSettings};
use clap::Args;

#[derive(Debug, Args)]
pub struct RecoverArgs {
    /// Id printed by a failed ingest
    pub operation_id: OperationId,
}

pub fn execute(args: RecoverArgs, settings: EngineSettings) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = Engine::new(settings);
    let outcome = engine.recover(args.operation_id);
    print_json(&outcome)?;

    match outcome {
        RecoveryOutcome::Error { message, .. } => Err(message.into()),
        _ => Ok(()),
    }
}
