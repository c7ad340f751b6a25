//! Admin endpoints

use std::time::Duration;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::services::response_cache;
use crate::AppState;

/// Prune age when the request omits one
const DEFAULT_PRUNE_HOURS: u64 = 24;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CacheClearRequest {
    pub hours: Option<u64>,
}

/// POST /api/admin/cache/clear
///
/// Deletes cached clips and scratch artifacts older than `hours`. Unlike the
/// analysis endpoints this one surfaces filesystem failures as 500; an
/// operator calling it wants to know the disk is misbehaving.
pub async fn clear_cache(
    State(state): State<AppState>,
    Json(request): Json<CacheClearRequest>,
) -> ApiResult<Json<Value>> {
    let hours = request.hours.unwrap_or(DEFAULT_PRUNE_HOURS);
    let older_than = Duration::from_secs(hours.saturating_mul(3600));
    let roots = vec![state.config.cache_dir(), state.config.scratch_dir()];

    let outcome =
        tokio::task::spawn_blocking(move || response_cache::prune_files(&roots, older_than))
            .await
            .map_err(|e| ApiError::Internal(format!("Prune task failed: {e}")))?;

    match outcome {
        Ok(cleared_files) => {
            // An out-of-range cutoff prunes nothing
            let session_cutoff = chrono::Duration::from_std(older_than)
                .unwrap_or_else(|_| chrono::Duration::hours(24 * 3650));
            let cleared_sessions = state.store.prune_completed(session_cutoff).await;
            tracing::info!(hours, cleared_files, cleared_sessions, "Cache cleared");
            Ok(Json(json!({ "cleared_files": cleared_files })))
        }
        Err(e) => {
            *state.last_error.write().await = Some(e.to_string());
            Err(e.into())
        }
    }
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/api/admin/cache/clear", post(clear_cache))
}
