//! Core types shared across ChartX facilities
//!
//! This crate provides foundational types used by both error handling
//! and logging facilities:
//!
//! - **Correlation types**: OperationId, the token that ties a reconcile
//!   call to its retained state snapshot and any later recovery attempt
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction of
//!   patient identifiers in logs
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::OperationId;
pub use sensitive::Sensitive;
