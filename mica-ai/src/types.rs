//! Base types shared across the analysis pipeline

use serde::{Deserialize, Serialize};

// ============================================================================
// Capability availability
// ============================================================================

/// Tagged availability for a capability adapter.
///
/// Availability is decided once at startup. Handlers and the fusion layer
/// consume adapter *results*, never adapter objects: an `Unavailable`
/// capability degrades to its deterministic default result, it never errors.
pub enum Capability<T> {
    Available(T),
    Unavailable { reason: String },
}

impl<T> Capability<T> {
    /// Wrap a probe result, logging the unavailability reason
    pub fn from_probe(name: &str, probe: Result<T, String>) -> Self {
        match probe {
            Ok(adapter) => {
                tracing::info!(adapter = name, "Capability available");
                Capability::Available(adapter)
            }
            Err(reason) => {
                tracing::warn!(adapter = name, reason = %reason, "Capability unavailable, will degrade to defaults");
                Capability::Unavailable { reason }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    pub fn as_available(&self) -> Option<&T> {
        match self {
            Capability::Available(adapter) => Some(adapter),
            Capability::Unavailable { .. } => None,
        }
    }

    /// Unavailability reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Capability::Available(_) => None,
            Capability::Unavailable { reason } => Some(reason),
        }
    }
}

// ============================================================================
// Adapter status reporting
// ============================================================================

/// Availability report for one adapter, as returned by GET /ai/test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AdapterStatus {
    pub fn available() -> Self {
        Self {
            available: true,
            reason: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            available: false,
            reason: Some(reason.into()),
        }
    }

    pub fn of<T>(capability: &Capability<T>) -> Self {
        match capability {
            Capability::Available(_) => Self::available(),
            Capability::Unavailable { reason } => Self::unavailable(reason.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_success_is_available() {
        let cap: Capability<u32> = Capability::from_probe("stt", Ok(7));
        assert!(cap.is_available());
        assert_eq!(cap.as_available(), Some(&7));
        assert_eq!(cap.reason(), None);
    }

    #[test]
    fn probe_failure_keeps_reason() {
        let cap: Capability<u32> =
            Capability::from_probe("stt", Err("binary not found".to_string()));
        assert!(!cap.is_available());
        assert_eq!(cap.reason(), Some("binary not found"));
    }

    #[test]
    fn status_serializes_without_reason_when_available() {
        let status = AdapterStatus::available();
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["available"], true);
        assert!(json.get("reason").is_none());
    }
}
