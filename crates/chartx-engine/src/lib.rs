//! ChartX Engine - Orchestration layer
//!
//! Coordinates document parsing, the store, and the operation-state
//! snapshots into the two public operations: reconcile and recover.

pub mod cache;
pub mod commands;
pub mod engine;
pub mod settings;

pub use cache::PatientCache;
pub use commands::reconcile::{reconcile_document, ReconcileState};
pub use commands::recover::recover;
pub use engine::Engine;
pub use settings::{EngineSettings, TermCheck};
