//! Timestamp utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Age in whole seconds of a past timestamp (0 for future timestamps)
pub fn age_seconds(since: DateTime<Utc>) -> u64 {
    Utc::now()
        .signed_duration_since(since)
        .num_seconds()
        .max(0) as u64
}
