//! Engine settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which medical-term check runs before writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermCheck {
    /// Accept every term
    Off,
    /// Reject blank, letter-free, and vague terms
    #[default]
    Rules,
}

/// Where the engine keeps its data and how it talks to SQLite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub db_path: PathBuf,
    pub state_dir: PathBuf,
    pub busy_timeout_ms: u64,
    pub term_check: TermCheck,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(".chartx/store.db"),
            state_dir: PathBuf::from(".chartx/operations"),
            busy_timeout_ms: chartx_store::db::DEFAULT_BUSY_TIMEOUT_MS,
            term_check: TermCheck::Rules,
        }
    }
}

impl EngineSettings {
    /// Settings with both paths under one directory
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            db_path: dir.join("store.db"),
            state_dir: dir.join("operations"),
            ..Self::default()
        }
    }
}
