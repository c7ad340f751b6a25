//! Centralized fallback payload pieces
//!
//! Analysis and generation failures never surface as 5xx. Handlers fall back
//! to these fixed pieces instead, in three families: missing upload (2.5),
//! processing error (2.0), degraded analyzer (axis marked 처리 실패).

use crate::analysis::feedback::{axis_name, SAMPLE_ANSWER_HINT};
use crate::models::{Axis, MultimodalObservation, ScoreFeedback, ScoreVector};

pub const MISSING_FILE_TEXT: &str = "답변 영상이 제공되지 않았습니다.";
pub const ERROR_TEXT: &str = "처리 중 오류가 발생했습니다.";
pub const ERROR_OVERALL: &str = "처리 중 오류";
pub const FAILED_AXIS: &str = "처리 실패";
pub const MISSING_FILE_OVERALL: &str =
    "답변 영상을 제출해주시면 더 정확한 피드백을 제공할 수 있습니다.";
const ERROR_SAMPLE_ANSWER: &str = "오류로 인해 예시 답안을 제공할 수 없습니다.";

pub const MISSING_FILE_SCORE: f64 = 2.5;
pub const ERROR_SCORE: f64 = 2.0;

pub fn missing_file_scores() -> ScoreVector {
    ScoreVector::uniform(MISSING_FILE_SCORE)
}

pub fn error_scores() -> ScoreVector {
    ScoreVector::uniform(ERROR_SCORE)
}

fn axis_needed(axis: Axis) -> String {
    format!("{} 평가를 위해 답변 영상이 필요합니다.", axis_name(axis))
}

/// Debate feedback when no upload was provided
pub fn missing_file_feedback() -> ScoreFeedback {
    ScoreFeedback {
        initiative: axis_needed(Axis::Initiative),
        collaborative: axis_needed(Axis::Collaborative),
        communication: axis_needed(Axis::Communication),
        logic: axis_needed(Axis::Logic),
        problem_solving: axis_needed(Axis::ProblemSolving),
        voice: axis_needed(Axis::Voice),
        action: axis_needed(Axis::Action),
        overall: MISSING_FILE_OVERALL.to_string(),
        sample_answer: SAMPLE_ANSWER_HINT.to_string(),
    }
}

/// Debate feedback when composition itself failed
pub fn error_feedback() -> ScoreFeedback {
    ScoreFeedback {
        initiative: FAILED_AXIS.to_string(),
        collaborative: FAILED_AXIS.to_string(),
        communication: FAILED_AXIS.to_string(),
        logic: FAILED_AXIS.to_string(),
        problem_solving: FAILED_AXIS.to_string(),
        voice: FAILED_AXIS.to_string(),
        action: FAILED_AXIS.to_string(),
        overall: ERROR_OVERALL.to_string(),
        sample_answer: ERROR_SAMPLE_ANSWER.to_string(),
    }
}

fn slot_mut(feedback: &mut ScoreFeedback, axis: Axis) -> &mut String {
    match axis {
        Axis::Initiative => &mut feedback.initiative,
        Axis::Collaborative => &mut feedback.collaborative,
        Axis::Communication => &mut feedback.communication,
        Axis::Logic => &mut feedback.logic,
        Axis::ProblemSolving => &mut feedback.problem_solving,
        Axis::Voice => &mut feedback.voice,
        Axis::Action => &mut feedback.action,
    }
}

/// Overwrite axis feedback whose analyzer fell back to defaults.
///
/// A floored score would otherwise read as a judgement of the answer; the
/// honest wording is that the analyzer did not run.
pub fn apply_degraded_feedback(
    feedback: &mut ScoreFeedback,
    observation: &MultimodalObservation,
) {
    let mut mark = |axes: &[Axis]| {
        for axis in axes {
            *slot_mut(feedback, *axis) = format!("{}: {}", axis_name(*axis), FAILED_AXIS);
        }
    };
    if observation.transcript.degraded {
        mark(&Axis::CONTENT);
    }
    if observation.facial.degraded {
        mark(&Axis::FACIAL);
    }
    if observation.acoustic.degraded {
        mark(&Axis::ACOUSTIC);
    }
}

/// Condensed interview defaults (content, voice, action + overall)
#[derive(Debug, Clone, Copy)]
pub struct InterviewAnswerDefaults {
    pub answer_text: &'static str,
    pub score: f64,
    pub content_feedback: &'static str,
    pub voice_feedback: &'static str,
    pub action_feedback: &'static str,
    pub overall: &'static str,
}

pub fn interview_missing_file() -> InterviewAnswerDefaults {
    InterviewAnswerDefaults {
        answer_text: MISSING_FILE_TEXT,
        score: MISSING_FILE_SCORE,
        content_feedback: "내용 평가를 위해 답변이 필요합니다.",
        voice_feedback: "음성 평가를 위해 답변이 필요합니다.",
        action_feedback: "행동 평가를 위해 답변이 필요합니다.",
        overall: MISSING_FILE_OVERALL,
    }
}

pub fn interview_error() -> InterviewAnswerDefaults {
    InterviewAnswerDefaults {
        answer_text: ERROR_TEXT,
        score: ERROR_SCORE,
        content_feedback: FAILED_AXIS,
        voice_feedback: FAILED_AXIS,
        action_feedback: FAILED_AXIS,
        overall: ERROR_OVERALL,
    }
}
