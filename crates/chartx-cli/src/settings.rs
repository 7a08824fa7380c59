//! Settings loading
//!
//! Layers, lowest first: built-in defaults, `chartx.toml` (or the file given
//! with `--config`), `CHARTX_*` environment variables (a `.env` file in the
//! working directory is read into the environment first), then CLI flags.

use chartx_core::errors::{CxError, CxErrorKind};
use chartx_engine::EngineSettings;
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "chartx.toml";
pub const ENV_PREFIX: &str = "CHARTX";

/// Values from the command line that win over every other layer
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
}

/// Resolve engine settings for this invocation
///
/// # Errors
/// `Config` when the explicit config file is missing or any layer holds a
/// value of the wrong type.
pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<EngineSettings, CxError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let file = match config_file {
        Some(path) => File::from(path).required(true),
        None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
    };

    let mut settings: EngineSettings = Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(config_error)?;

    if let Some(db_path) = &overrides.db_path {
        settings.db_path = db_path.clone();
    }
    if let Some(state_dir) = &overrides.state_dir {
        settings.state_dir = state_dir.clone();
    }
    Ok(settings)
}

fn config_error(err: config::ConfigError) -> CxError {
    CxError::new(CxErrorKind::Config)
        .with_op("load_settings")
        .with_message(err.to_string())
}
