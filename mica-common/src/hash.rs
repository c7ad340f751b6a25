//! Content-addressed cache keys
//!
//! Generated artifacts (avatar clips, composed payloads) are keyed by the hex
//! SHA-256 digest of their canonical input tuple, joined with `|`. Identical
//! inputs always produce identical keys, which is what makes concurrent writers
//! of the same artifact safe: they write identical bytes to identical paths.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of the canonical `|`-joined input tuple
pub fn cache_key(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parts.join("|").as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
