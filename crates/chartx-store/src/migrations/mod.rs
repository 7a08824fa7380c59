//! Migration framework
//!
//! Provides:
//! - Migration runner with stored checksums
//! - Idempotent application
//! - Embedded SQL migrations for the patient schema

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
