//! Document rules
//!
//! Checks and normalisations applied to a Table Operation Document before
//! anything touches the store.

pub mod dates;
pub mod validation;
