//! Repository layer for the patient schema
//!
//! - `identity`: email to `patient_id`
//! - `upsert`: document writes inside a caller-owned transaction
//! - `verify`: read-back of those writes
//! - `read`: pre-images and patient summaries

pub mod identity;
pub mod read;
pub mod upsert;
pub mod verify;

pub use identity::resolve;
pub use upsert::AppliedWrite;
