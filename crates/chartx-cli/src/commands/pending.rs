//! Pending command
//!
//! Usage: chartx pending [--verbose]

use super::print_json;
use chartx_engine::{Engine, EngineSettings};
use clap::Args;

#[derive(Debug, Args)]
pub struct PendingArgs {
    /// Print each retained snapshot instead of just its id
    #[arg(long)]
    pub verbose: bool,
}

pub fn execute(args: PendingArgs, settings: EngineSettings) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::new(settings);
    let ids = engine.pending()?;

    if !args.verbose {
        for id in ids {
            println!("{}", id);
        }
        return Ok(());
    }

    let mut states = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(state) = engine.pending_state(id)? {
            states.push(state);
        }
    }
    print_json(&states)
}
