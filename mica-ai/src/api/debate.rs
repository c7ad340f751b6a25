//! Debate endpoints
//!
//! AI opening generation, per-phase clip analysis, and debater avatar clips.
//! Phase uploads answer 200 with default scores when the clip is missing;
//! the session only advances on a successful submission of the current phase.

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::models::{DebatePhase, Position};
use crate::session::templates;
use crate::AppState;

use super::{parse_gender, read_upload, serve_mp4};

#[derive(Debug, Deserialize)]
pub struct AiOpeningRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub position: String,
}

/// POST /ai/debate/:debate_id/ai-opening
///
/// Registers the debate and returns the AI's opening statement for the
/// opposite position. An empty topic falls back to the stock one.
pub async fn ai_opening(
    State(state): State<AppState>,
    Path(debate_id): Path<i64>,
    Json(request): Json<AiOpeningRequest>,
) -> Json<Value> {
    let topic = if request.topic.trim().is_empty() {
        templates::DEFAULT_TOPIC.to_string()
    } else {
        request.topic.trim().to_string()
    };
    let user_position = Position::parse(&request.position).unwrap_or(Position::Pro);
    let text = state
        .orchestrator
        .ai_opening(debate_id, topic.clone(), user_position)
        .await;
    Json(json!({
        "ai_opening_text": text,
        "debate_id": debate_id,
        "topic": topic,
        "position": user_position.as_str(),
    }))
}

/// POST /ai/debate/:debate_id/:phase-video
///
/// The path segment arrives as "opening-video", "rebuttal-video",
/// "counter-rebuttal-video", or "closing-video".
pub async fn phase_video(
    State(state): State<AppState>,
    Path((debate_id, segment)): Path<(i64, String)>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let phase = segment
        .strip_suffix("-video")
        .and_then(DebatePhase::parse_path_segment)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown debate phase: {segment}")))?;
    let bytes = read_upload(&mut multipart).await?.unwrap_or_default();
    let payload = state
        .orchestrator
        .process_debate_phase(debate_id, phase, &bytes)
        .await;
    Ok(Json(payload))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DebaterVideoRequest {
    pub ai_opening_text: Option<String>,
    pub ai_rebuttal_text: Option<String>,
    pub ai_counter_rebuttal_text: Option<String>,
    pub ai_closing_text: Option<String>,
    pub debater_gender: String,
}

impl DebaterVideoRequest {
    fn text_for(&self, phase: DebatePhase) -> Option<&str> {
        match phase {
            DebatePhase::Opening => self.ai_opening_text.as_deref(),
            DebatePhase::Rebuttal => self.ai_rebuttal_text.as_deref(),
            DebatePhase::CounterRebuttal => self.ai_counter_rebuttal_text.as_deref(),
            DebatePhase::Closing => self.ai_closing_text.as_deref(),
            DebatePhase::Completed => None,
        }
    }
}

/// Shared body for the four /ai/debate/ai-*-video routes
async fn debater_video(
    state: AppState,
    phase: DebatePhase,
    request: DebaterVideoRequest,
) -> ApiResult<Response> {
    let text = match request.text_for(phase) {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => templates::debate_fallback(phase, Position::Con, templates::DEFAULT_TOPIC),
    };
    let gender = parse_gender(&request.debater_gender);
    let clip = state
        .orchestrator
        .render_debater(phase, &text, gender)
        .await?;
    serve_mp4(&clip).await
}

pub async fn ai_opening_video(
    State(state): State<AppState>,
    Json(request): Json<DebaterVideoRequest>,
) -> ApiResult<Response> {
    debater_video(state, DebatePhase::Opening, request).await
}

pub async fn ai_rebuttal_video(
    State(state): State<AppState>,
    Json(request): Json<DebaterVideoRequest>,
) -> ApiResult<Response> {
    debater_video(state, DebatePhase::Rebuttal, request).await
}

pub async fn ai_counter_rebuttal_video(
    State(state): State<AppState>,
    Json(request): Json<DebaterVideoRequest>,
) -> ApiResult<Response> {
    debater_video(state, DebatePhase::CounterRebuttal, request).await
}

pub async fn ai_closing_video(
    State(state): State<AppState>,
    Json(request): Json<DebaterVideoRequest>,
) -> ApiResult<Response> {
    debater_video(state, DebatePhase::Closing, request).await
}

pub fn debate_routes() -> Router<AppState> {
    // Literal ai-* routes must be registered alongside the parameterized
    // ones; the router prefers static segments, so /ai/debate/ai-opening-video
    // never collides with /ai/debate/:debate_id/:segment.
    Router::new()
        .route("/ai/debate/ai-opening-video", post(ai_opening_video))
        .route("/ai/debate/ai-rebuttal-video", post(ai_rebuttal_video))
        .route(
            "/ai/debate/ai-counter-rebuttal-video",
            post(ai_counter_rebuttal_video),
        )
        .route("/ai/debate/ai-closing-video", post(ai_closing_video))
        .route("/ai/debate/:debate_id/ai-opening", post(ai_opening))
        .route("/ai/debate/:debate_id/:segment", post(phase_video))
}
