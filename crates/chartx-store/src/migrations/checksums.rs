//! Migration checksums
//!
//! A migration's SHA256 is stored when it is applied and compared on every
//! later run, so an edited migration file is caught instead of skipped.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA256 of migration SQL
pub fn compute_checksum(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
