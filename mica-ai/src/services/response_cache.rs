//! Response cache
//!
//! Two tiers: a TTL'd in-memory map for small JSON payloads, and keyed paths
//! into the on-disk artifact layout for rendered clips. Keys are hex SHA-256
//! digests. A file entry is only served while its backing file still exists;
//! the admin prune may delete artifacts underneath the map at any time.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::RwLock;

use crate::config::MEMORY_CACHE_TTL_SECS;

struct ValueEntry {
    value: serde_json::Value,
    inserted_at: Instant,
}

/// In-memory and artifact-path cache
pub struct ResponseCache {
    ttl: Duration,
    values: RwLock<HashMap<String, ValueEntry>>,
    files: RwLock<HashMap<String, PathBuf>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(MEMORY_CACHE_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            values: RwLock::new(HashMap::new()),
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Get a live value with its age in seconds
    pub async fn get(&self, key: &str) -> Option<(serde_json::Value, u64)> {
        let now = Instant::now();
        {
            let values = self.values.read().await;
            match values.get(key) {
                Some(entry) => {
                    let age = now.duration_since(entry.inserted_at);
                    if age < self.ttl {
                        return Some((entry.value.clone(), age.as_secs()));
                    }
                }
                None => return None,
            }
        }

        // Expired: evict under the write lock
        self.values.write().await.remove(key);
        None
    }

    pub async fn put(&self, key: &str, value: serde_json::Value) {
        self.values.write().await.insert(
            key.to_string(),
            ValueEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Get an artifact path; None once the backing file is gone
    pub async fn get_file(&self, key: &str) -> Option<PathBuf> {
        let path = self.files.read().await.get(key).cloned()?;
        if path.exists() {
            return Some(path);
        }
        self.files.write().await.remove(key);
        None
    }

    pub async fn put_file(&self, key: &str, path: PathBuf) {
        self.files.write().await.insert(key.to_string(), path);
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Delete cached .mp4 artifacts older than the cutoff; returns the count
pub fn prune_files(roots: &[PathBuf], older_than: Duration) -> std::io::Result<usize> {
    let cutoff = SystemTime::now()
        .checked_sub(older_than)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut cleared = 0usize;
    for root in roots {
        if !root.exists() {
            continue;
        }
        for entry in walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let is_mp4 = entry
                .path()
                .extension()
                .map(|e| e == "mp4")
                .unwrap_or(false);
            if !is_mp4 {
                continue;
            }
            let modified = std::fs::metadata(entry.path())?.modified()?;
            if modified <= cutoff {
                std::fs::remove_file(entry.path())?;
                cleared += 1;
            }
        }
    }

    tracing::info!(cleared, "Pruned cached artifacts");
    Ok(cleared)
}
