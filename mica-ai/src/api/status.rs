//! Adapter availability report

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::types::AdapterStatus;
use crate::AppState;

/// GET /ai/test response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// "ok" when every adapter probed available, otherwise "degraded"
    pub status: String,
    pub adapters: AdapterReport,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct AdapterReport {
    pub stt: AdapterStatus,
    pub facial: AdapterStatus,
    pub acoustic: AdapterStatus,
    pub llm: AdapterStatus,
    pub avatar: AdapterStatus,
}

/// GET /ai/test
///
/// Per-adapter availability as probed at startup. A degraded adapter never
/// fails a request; this endpoint is how operators see what will degrade.
pub async fn adapter_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let adapters = &state.adapters;
    let report = AdapterReport {
        stt: AdapterStatus::of(&adapters.whisper),
        facial: AdapterStatus::of(&adapters.openface),
        acoustic: AdapterStatus::of(&adapters.acoustic),
        llm: AdapterStatus::of(&adapters.llm),
        avatar: AdapterStatus::of(&adapters.avatar),
    };
    let all_available = report.stt.available
        && report.facial.available
        && report.acoustic.available
        && report.llm.available
        && report.avatar.available;

    Json(StatusResponse {
        status: if all_available { "ok" } else { "degraded" }.to_string(),
        adapters: report,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build adapter status routes
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/ai/test", get(adapter_status))
}
