//! Correlation types for operation tracking
//!
//! An `OperationId` is minted once per reconcile call. It names the
//! operation-state file written before any mutation, appears on every log
//! event of the call, and is handed back to the caller on failure so the
//! recovery executor can be pointed at the retained snapshot later.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a single reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Generate a new OperationId using UUIDv7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for OperationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_id_unique() {
        let a = OperationId::new();
        let b = OperationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_operation_id_parse_display_roundtrip() {
        let id = OperationId::new();
        let parsed: OperationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_operation_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<OperationId>().is_err());
    }

    #[test]
    fn test_operation_id_serializes_as_plain_string() {
        let id = OperationId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
