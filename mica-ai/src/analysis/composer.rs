//! Endpoint payload composition
//!
//! One builder per endpoint family maps a PhaseRecord (or a default) onto the
//! fixed response shape. Every documented field is always present; scores are
//! already clamped and rounded when they reach this module. `next_phase`
//! always reports the phase the session expects next.

use serde_json::{json, Map, Value};

use crate::analysis::defaults::{self, InterviewAnswerDefaults};
use crate::analysis::feedback::interview_feedback;
use crate::models::{round_score, Axis, DebatePhase, PhaseRecord, ScoreFeedback, ScoreVector};

/// Substitute answer text when recognition produced nothing
pub const NO_SPEECH_TEXT: &str = "음성이 인식되지 않았습니다.";

fn display_text(transcript: &str) -> &str {
    let trimmed = transcript.trim();
    if trimmed.is_empty() {
        NO_SPEECH_TEXT
    } else {
        trimmed
    }
}

/// Interview answer evaluation (condensed content / voice / action view)
pub fn interview_answer_payload(
    interview_id: i64,
    question_type: &str,
    record: &PhaseRecord,
    next_phase: &str,
) -> Value {
    // Condensed axes: content averages the four transcript-derived scores,
    // action averages the two facial-behavior scores.
    let content = round_score(record.scores.mean_of(&Axis::CONTENT));
    let voice = record.scores.voice;
    let action = round_score(record.scores.mean_of(&Axis::FACIAL));
    let mut feedback = interview_feedback(content, voice, action);
    if record.observation.transcript.degraded {
        feedback.content = defaults::FAILED_AXIS.to_string();
    }
    if record.observation.acoustic.degraded {
        feedback.voice = defaults::FAILED_AXIS.to_string();
    }
    if record.observation.facial.degraded {
        feedback.action = defaults::FAILED_AXIS.to_string();
    }
    json!({
        "interview_id": interview_id,
        "question_type": question_type,
        "answer_text": display_text(&record.transcript_text),
        "content_score": content,
        "voice_score": voice,
        "action_score": action,
        "content_feedback": feedback.content,
        "voice_feedback": feedback.voice,
        "action_feedback": feedback.action,
        "feedback": feedback.overall,
        "next_phase": next_phase,
    })
}

fn interview_default_payload(
    interview_id: i64,
    question_type: &str,
    next_phase: &str,
    d: InterviewAnswerDefaults,
) -> Value {
    json!({
        "interview_id": interview_id,
        "question_type": question_type,
        "answer_text": d.answer_text,
        "content_score": d.score,
        "voice_score": d.score,
        "action_score": d.score,
        "content_feedback": d.content_feedback,
        "voice_feedback": d.voice_feedback,
        "action_feedback": d.action_feedback,
        "feedback": d.overall,
        "next_phase": next_phase,
    })
}

pub fn interview_missing_file_payload(
    interview_id: i64,
    question_type: &str,
    next_phase: &str,
) -> Value {
    interview_default_payload(
        interview_id,
        question_type,
        next_phase,
        defaults::interview_missing_file(),
    )
}

pub fn interview_error_payload(interview_id: i64, question_type: &str, next_phase: &str) -> Value {
    interview_default_payload(
        interview_id,
        question_type,
        next_phase,
        defaults::interview_error(),
    )
}

fn debate_payload_parts(
    debate_id: i64,
    topic: &str,
    phase: DebatePhase,
    user_text: &str,
    scores: &ScoreVector,
    feedback: &ScoreFeedback,
    ai_next: Option<(DebatePhase, &str)>,
    next_phase: &str,
) -> Value {
    let mut body = Map::new();
    body.insert("debate_id".to_string(), json!(debate_id));
    body.insert("topic".to_string(), json!(topic));
    body.insert(format!("user_{}_text", phase.as_str()), json!(user_text));
    if let Some((reply_phase, text)) = ai_next {
        body.insert(format!("ai_{}_text", reply_phase.as_str()), json!(text));
    }
    body.insert("initiative_score".to_string(), json!(scores.initiative));
    body.insert(
        "collaborative_score".to_string(),
        json!(scores.collaborative),
    );
    body.insert(
        "communication_score".to_string(),
        json!(scores.communication),
    );
    body.insert("logic_score".to_string(), json!(scores.logic));
    body.insert(
        "problem_solving_score".to_string(),
        json!(scores.problem_solving),
    );
    body.insert("voice_score".to_string(), json!(scores.voice));
    body.insert("action_score".to_string(), json!(scores.action));
    body.insert(
        "initiative_feedback".to_string(),
        json!(feedback.initiative),
    );
    body.insert(
        "collaborative_feedback".to_string(),
        json!(feedback.collaborative),
    );
    body.insert(
        "communication_feedback".to_string(),
        json!(feedback.communication),
    );
    body.insert("logic_feedback".to_string(), json!(feedback.logic));
    body.insert(
        "problem_solving_feedback".to_string(),
        json!(feedback.problem_solving),
    );
    body.insert("voice_feedback".to_string(), json!(feedback.voice));
    body.insert("action_feedback".to_string(), json!(feedback.action));
    body.insert("feedback".to_string(), json!(feedback.overall));
    body.insert("sample_answer".to_string(), json!(feedback.sample_answer));
    body.insert("next_phase".to_string(), json!(next_phase));
    Value::Object(body)
}

/// Debate turn evaluation; `ai_next` carries the reply utterance for the
/// following phase and is omitted after closing.
pub fn debate_phase_payload(
    debate_id: i64,
    topic: &str,
    phase: DebatePhase,
    record: &PhaseRecord,
    ai_next: Option<(DebatePhase, &str)>,
    next_phase: &str,
) -> Value {
    debate_payload_parts(
        debate_id,
        topic,
        phase,
        display_text(&record.transcript_text),
        &record.scores,
        &record.feedback,
        ai_next,
        next_phase,
    )
}

pub fn debate_missing_file_payload(
    debate_id: i64,
    topic: &str,
    phase: DebatePhase,
    ai_next: Option<(DebatePhase, &str)>,
    next_phase: &str,
) -> Value {
    debate_payload_parts(
        debate_id,
        topic,
        phase,
        defaults::MISSING_FILE_TEXT,
        &defaults::missing_file_scores(),
        &defaults::missing_file_feedback(),
        ai_next,
        next_phase,
    )
}

pub fn debate_error_payload(
    debate_id: i64,
    topic: &str,
    phase: DebatePhase,
    ai_next: Option<(DebatePhase, &str)>,
    next_phase: &str,
) -> Value {
    debate_payload_parts(
        debate_id,
        topic,
        phase,
        defaults::ERROR_TEXT,
        &defaults::error_scores(),
        &defaults::error_feedback(),
        ai_next,
        next_phase,
    )
}
