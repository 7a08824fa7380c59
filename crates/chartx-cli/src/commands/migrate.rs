//! Migrate command
//!
//! Usage: chartx migrate

use chartx_engine::{Engine, EngineSettings};
use clap::Args;

#[derive(Debug, Args)]
pub struct MigrateArgs {}

pub fn execute(_args: MigrateArgs, settings: EngineSettings) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::new(settings);
    for id in engine.migrate()? {
        println!("✓ {}", id);
    }
    Ok(())
}
