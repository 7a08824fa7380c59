//! Command orchestration layer.
//!
//! Each command runs against a connection the caller opened and a state
//! store the caller owns.

pub mod reconcile;
pub mod recover;
