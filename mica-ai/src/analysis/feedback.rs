//! Score-driven feedback strings
//!
//! Every feedback string is selected from a fixed (axis, bucket) table so the
//! wording is stable across runs. Buckets: low < 3.0, mid < 4.0, high >= 4.0.
//! Feedback text is Korean; axis identifiers stay ASCII.

use crate::models::{Axis, ScoreFeedback, ScoreVector};

/// Generic coaching line attached to every debate evaluation
pub const SAMPLE_ANSWER_HINT: &str =
    "구체적인 근거와 예시를 들어 논리적으로 설명하는 것이 좋습니다.";

/// Score bucket for table lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Low,
    Mid,
    High,
}

impl Bucket {
    pub fn of(score: f64) -> Bucket {
        if score < 3.0 {
            Bucket::Low
        } else if score < 4.0 {
            Bucket::Mid
        } else {
            Bucket::High
        }
    }
}

/// Korean display name for an axis
pub fn axis_name(axis: Axis) -> &'static str {
    match axis {
        Axis::Initiative => "적극성",
        Axis::Collaborative => "협력성",
        Axis::Communication => "의사소통",
        Axis::Logic => "논리성",
        Axis::ProblemSolving => "문제해결",
        Axis::Voice => "음성품질",
        Axis::Action => "행동표현",
    }
}

fn tier_word(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::High => "우수",
        Bucket::Mid => "양호",
        Bucket::Low => "개선 필요",
    }
}

fn axis_sentence(axis: Axis, score: f64) -> String {
    format!("{}: {}", axis_name(axis), tier_word(Bucket::of(score)))
}

fn debate_overall(mean: f64) -> &'static str {
    match Bucket::of(mean) {
        Bucket::High => "우수한 토론 수행을 보여주었습니다.",
        Bucket::Mid => "양호한 토론 수행을 보여주었습니다.",
        Bucket::Low => "토론 수행에 개선이 필요합니다.",
    }
}

/// Per-axis feedback for one debate turn
pub fn debate_feedback(scores: &ScoreVector) -> ScoreFeedback {
    ScoreFeedback {
        initiative: axis_sentence(Axis::Initiative, scores.initiative),
        collaborative: axis_sentence(Axis::Collaborative, scores.collaborative),
        communication: axis_sentence(Axis::Communication, scores.communication),
        logic: axis_sentence(Axis::Logic, scores.logic),
        problem_solving: axis_sentence(Axis::ProblemSolving, scores.problem_solving),
        voice: axis_sentence(Axis::Voice, scores.voice),
        action: axis_sentence(Axis::Action, scores.action),
        overall: debate_overall(scores.mean()).to_string(),
        sample_answer: SAMPLE_ANSWER_HINT.to_string(),
    }
}

/// Interview payloads expose three condensed axes instead of the full seven
#[derive(Debug, Clone)]
pub struct InterviewFeedback {
    pub content: String,
    pub voice: String,
    pub action: String,
    pub overall: String,
}

fn content_sentence(score: f64) -> &'static str {
    match Bucket::of(score) {
        Bucket::High => "충분하고 체계적인 답변입니다.",
        Bucket::Mid => "내용이 구체적이고 적절합니다.",
        Bucket::Low => "내용을 좀 더 구체적으로 설명해 주세요.",
    }
}

fn voice_sentence(score: f64) -> &'static str {
    match Bucket::of(score) {
        Bucket::High => "명확하고 안정적인 음성입니다.",
        Bucket::Mid => "목소리가 안정적입니다.",
        Bucket::Low => "좀 더 명확하고 안정적으로 말씀해 주세요.",
    }
}

fn action_sentence(score: f64) -> &'static str {
    match Bucket::of(score) {
        Bucket::High => "자신감 있고 안정적인 태도입니다.",
        Bucket::Mid => "시선과 표정이 자연스럽습니다.",
        Bucket::Low => "눈맞춤과 자세를 개선해 주세요.",
    }
}

fn interview_overall(mean: f64) -> &'static str {
    match Bucket::of(mean) {
        Bucket::High => "충분한 내용을 안정적인 음성으로 전달하셨습니다.",
        Bucket::Mid => "전반적으로 양호한 답변이었습니다.",
        Bucket::Low => "답변 내용과 전달 방식에 개선이 필요합니다.",
    }
}

/// Interview feedback from the condensed (content, voice, action) scores
pub fn interview_feedback(content: f64, voice: f64, action: f64) -> InterviewFeedback {
    let mean = (content + voice + action) / 3.0;
    InterviewFeedback {
        content: content_sentence(content).to_string(),
        voice: voice_sentence(voice).to_string(),
        action: action_sentence(action).to_string(),
        overall: interview_overall(mean).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_boundaries() {
        assert_eq!(Bucket::of(2.9), Bucket::Low);
        assert_eq!(Bucket::of(3.0), Bucket::Mid);
        assert_eq!(Bucket::of(3.9), Bucket::Mid);
        assert_eq!(Bucket::of(4.0), Bucket::High);
        assert_eq!(Bucket::of(5.0), Bucket::High);
    }

    #[test]
    fn debate_feedback_covers_every_axis() {
        let scores = ScoreVector::uniform(3.5);
        let feedback = debate_feedback(&scores);
        for text in [
            &feedback.initiative,
            &feedback.collaborative,
            &feedback.communication,
            &feedback.logic,
            &feedback.problem_solving,
            &feedback.voice,
            &feedback.action,
            &feedback.overall,
            &feedback.sample_answer,
        ] {
            assert!(!text.is_empty());
        }
        assert_eq!(feedback.initiative, "적극성: 양호");
        assert_eq!(feedback.voice, "음성품질: 양호");
    }

    #[test]
    fn debate_overall_follows_mean_bucket() {
        let high = debate_feedback(&ScoreVector::uniform(4.2));
        assert_eq!(high.overall, "우수한 토론 수행을 보여주었습니다.");

        let low = debate_feedback(&ScoreVector::uniform(2.0));
        assert_eq!(low.overall, "토론 수행에 개선이 필요합니다.");
        assert_eq!(low.logic, "논리성: 개선 필요");
    }

    #[test]
    fn mixed_axes_bucket_independently() {
        let scores = ScoreVector::rounded(4.5, 2.0, 3.5, 4.0, 2.9, 3.0, 4.9);
        let feedback = debate_feedback(&scores);
        assert_eq!(feedback.initiative, "적극성: 우수");
        assert_eq!(feedback.collaborative, "협력성: 개선 필요");
        assert_eq!(feedback.communication, "의사소통: 양호");
        assert_eq!(feedback.logic, "논리성: 우수");
        assert_eq!(feedback.problem_solving, "문제해결: 개선 필요");
        assert_eq!(feedback.action, "행동표현: 우수");
    }

    #[test]
    fn interview_feedback_tracks_buckets() {
        let good = interview_feedback(4.2, 4.0, 4.1);
        assert_eq!(good.content, "충분하고 체계적인 답변입니다.");
        assert_eq!(good.voice, "명확하고 안정적인 음성입니다.");
        assert_eq!(good.action, "자신감 있고 안정적인 태도입니다.");
        assert_eq!(good.overall, "충분한 내용을 안정적인 음성으로 전달하셨습니다.");

        let weak = interview_feedback(2.0, 2.5, 2.9);
        assert_eq!(weak.content, "내용을 좀 더 구체적으로 설명해 주세요.");
        assert_eq!(weak.overall, "답변 내용과 전달 방식에 개선이 필요합니다.");

        let mid = interview_feedback(3.2, 3.7, 3.0);
        assert_eq!(mid.voice, "목소리가 안정적입니다.");
        assert_eq!(mid.overall, "전반적으로 양호한 답변이었습니다.");
    }
}
