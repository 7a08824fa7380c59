//! ChartX CLI
//!
//! Command-line driver for the ChartX reconciliation engine

use chartx_core::logging_facility::{init, Profile};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "chartx")]
#[command(about = "ChartX - Patient data reconciliation and persistence", long_about = None)]
struct Cli {
    /// Settings file (default: ./chartx.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Directory holding retained operation-state files
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconcile a mapped-output document into the store
    Ingest(commands::ingest::IngestArgs),
    /// Re-apply the pre-image of a failed operation
    Recover(commands::recover::RecoverArgs),
    /// List retained operation ids
    Pending(commands::pending::PendingArgs),
    /// Print a patient with their dependent rows
    Show(commands::show::ShowArgs),
    /// Apply schema migrations
    Migrate(commands::migrate::MigrateArgs),
}

fn main() {
    let cli = Cli::parse();

    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let overrides = settings::Overrides {
        db_path: cli.db,
        state_dir: cli.state_dir,
    };

    let result = match settings::load(cli.config.as_deref(), &overrides) {
        Ok(settings) => run(cli.command, settings),
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(
    command: Commands,
    settings: chartx_engine::EngineSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Ingest(args) => commands::ingest::execute(args, settings),
        Commands::Recover(args) => commands::recover::execute(args, settings),
        Commands::Pending(args) => commands::pending::execute(args, settings),
        Commands::Show(args) => commands::show::execute(args, settings),
        Commands::Migrate(args) => commands::migrate::execute(args, settings),
    }
}
