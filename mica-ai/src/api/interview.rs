//! Interview endpoints
//!
//! Question generation, per-phase answer analysis, follow-up planning, and
//! interviewer avatar clips. Analysis endpoints answer 200 even when the
//! upload is missing or an analyzer is down; the payload carries defaults
//! instead. Only a malformed request (unknown question type, broken
//! multipart) is a client error.

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::models::{CandidateProfile, GeneratedQuestion, InterviewPhase};
use crate::AppState;

use super::{parse_gender, read_upload, serve_mp4};

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionRequest {
    pub interview_id: i64,
    #[serde(flatten)]
    pub profile: CandidateProfile,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuestionResponse {
    pub interview_id: i64,
    pub questions: Vec<GeneratedQuestion>,
}

/// POST /ai/interview/generate-question
///
/// Produces the four-question set and registers the interview session.
pub async fn generate_questions(
    State(state): State<AppState>,
    Json(request): Json<GenerateQuestionRequest>,
) -> Json<GenerateQuestionResponse> {
    let questions = state
        .orchestrator
        .generate_questions(request.interview_id, request.profile)
        .await;
    Json(GenerateQuestionResponse {
        interview_id: request.interview_id,
        questions,
    })
}

/// POST /ai/interview/:interview_id/:question_type/answer-video
pub async fn answer_video(
    State(state): State<AppState>,
    Path((interview_id, question_type)): Path<(i64, String)>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let phase = InterviewPhase::parse(&question_type)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown question type: {question_type}")))?;
    let bytes = read_upload(&mut multipart).await?.unwrap_or_default();
    let payload = state
        .orchestrator
        .process_interview_answer(interview_id, phase, &bytes)
        .await;
    Ok(Json(payload))
}

/// POST /ai/interview/:interview_id/generate-followup-question
///
/// The clip is optional here; a planned follow-up from the TECH answer wins
/// over re-transcription.
pub async fn generate_followup(
    State(state): State<AppState>,
    Path(interview_id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let bytes = read_upload(&mut multipart).await?.unwrap_or_default();
    let question_text = state
        .orchestrator
        .generate_followup(interview_id, &bytes)
        .await;
    Ok(Json(json!({
        "interview_id": interview_id,
        "question_type": InterviewPhase::Followup.as_str(),
        "question_text": question_text,
    })))
}

#[derive(Debug, Deserialize)]
pub struct InterviewerVideoRequest {
    pub question_text: String,
    #[serde(default)]
    pub interviewer_gender: String,
}

/// POST /ai/interview/ai-video
///
/// Renders (or replays from cache) an interviewer clip speaking the question.
pub async fn interviewer_video(
    State(state): State<AppState>,
    Json(request): Json<InterviewerVideoRequest>,
) -> ApiResult<Response> {
    let gender = parse_gender(&request.interviewer_gender);
    let clip = state
        .orchestrator
        .render_interviewer(&request.question_text, gender)
        .await?;
    serve_mp4(&clip).await
}

pub fn interview_routes() -> Router<AppState> {
    Router::new()
        .route("/ai/interview/generate-question", post(generate_questions))
        .route("/ai/interview/ai-video", post(interviewer_video))
        .route(
            "/ai/interview/:interview_id/:question_type/answer-video",
            post(answer_video),
        )
        .route(
            "/ai/interview/:interview_id/generate-followup-question",
            post(generate_followup),
        )
}
