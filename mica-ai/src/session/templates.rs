//! Fixed Korean templates
//!
//! Questions, fallback utterances and avatar scripts all have deterministic
//! template forms so every generation path still works when the language
//! model adapter is unavailable.

use crate::models::{CandidateProfile, DebatePhase, InterviewPhase, Position};

/// Topic substituted when the client omits one
pub const DEFAULT_TOPIC: &str = "인공지능";

/// Generic follow-up when no technology token was recognized
pub const FOLLOWUP_GENERIC: &str = "방금 말씀하신 내용을 좀 더 구체적으로 설명해주실 수 있을까요?";

/// Template question for one interview phase
pub fn fallback_question(phase: InterviewPhase, profile: &CandidateProfile) -> String {
    match phase {
        InterviewPhase::Intro => format!(
            "'{}' 분야에서 {} 경력을 가진 지원자로서, 자신을 소개해주세요.",
            profile.job_category, profile.workexperience
        ),
        InterviewPhase::Fit => format!(
            "'{}' 직무에 지원하게 된 동기와 본인이 적합하다고 생각하는 이유를 설명해주세요.",
            profile.job_category
        ),
        InterviewPhase::Personality => format!(
            "지원자님의 '{}' 성격이 어떻게 업무에 도움이 될 수 있는지 설명해주세요.",
            profile.personality
        ),
        InterviewPhase::Tech => format!(
            "'{}' 기술을 활용한 프로젝트 경험에 대해 구체적으로 설명해주세요.",
            profile.tech_stack
        ),
        InterviewPhase::Followup => FOLLOWUP_GENERIC.to_string(),
    }
}

/// LLM drafting prompt for one interview question
pub fn question_prompt(phase: InterviewPhase, profile: &CandidateProfile) -> String {
    let intent = match phase {
        InterviewPhase::Intro => "지원자가 자신을 소개하도록 유도하는 질문",
        InterviewPhase::Fit => "지원 동기와 직무 적합성을 확인하는 질문",
        InterviewPhase::Personality => "성격과 협업 태도를 확인하는 질문",
        InterviewPhase::Tech => "기술 역량과 프로젝트 경험을 검증하는 질문",
        InterviewPhase::Followup => "직전 답변을 더 깊이 파고드는 후속 질문",
    };
    format!(
        "지원 분야: {}\n경력: {}\n학력: {}\n기술 스택: {}\n성격: {}\n경험: {}\n\n\
         위 지원자에게 할 {}을 한 문장으로 작성해주세요. 질문 문장만 출력하세요.",
        profile.job_category,
        profile.workexperience,
        profile.education,
        profile.tech_stack,
        profile.personality,
        profile.experience_description,
        intent
    )
}

/// Follow-up referencing the technology token found in the TECH answer
pub fn followup_fallback(token: &str) -> String {
    format!(
        "방금 언급하신 '{token}' 기술을 실무에서 어떻게 활용하셨는지 구체적으로 설명해주실 수 있을까요?"
    )
}

/// LLM drafting prompt for the follow-up question
pub fn followup_prompt(transcript: &str, token: &str) -> String {
    format!(
        "지원자의 직전 답변:\n\"{transcript}\"\n\n\
         답변에서 언급된 '{token}' 기술을 더 깊이 검증하는 후속 질문을 \
         한 문장으로 작성해주세요. 질문 문장만 출력하세요."
    )
}

/// Deterministic AI utterance per debate phase
pub fn debate_fallback(phase: DebatePhase, position: Position, topic: &str) -> String {
    match phase {
        DebatePhase::Opening => match position {
            Position::Pro => format!(
                "{topic}의 발전은 인류에게 긍정적인 영향을 미칠 것입니다. \
                 효율성 증대와 새로운 가능성을 제공하기 때문입니다."
            ),
            Position::Con => format!(
                "{topic}에 대해서는 신중한 접근이 필요합니다. \
                 여러 부작용과 위험성을 고려해야 합니다."
            ),
        },
        DebatePhase::Rebuttal => format!(
            "말씀하신 {topic}에 대한 의견을 경청했습니다. \
             하지만 다른 관점에서 보면 몇 가지 고려해야 할 점들이 있습니다."
        ),
        DebatePhase::CounterRebuttal => format!(
            "제기하신 점들을 충분히 이해했습니다. \
             그러나 {topic}의 장기적 관점에서 보면 여전히 신중한 접근이 필요합니다."
        ),
        DebatePhase::Closing => format!(
            "결론적으로 {topic}에 대한 이번 토론을 통해 다양한 관점을 확인할 수 있었습니다. \
             균형잡힌 시각이 중요하다고 생각합니다."
        ),
        DebatePhase::Completed => format!("{topic}에 대해 의견을 나눠주셔서 감사합니다."),
    }
}

/// LLM drafting prompt for the opening statement
pub fn opening_prompt(topic: &str, position: Position) -> String {
    let stance = match position {
        Position::Pro => "찬성",
        Position::Con => "반대",
    };
    format!(
        "토론 주제: {topic}\n입장: {stance}\n\n\
         위 주제에 대해 {stance} 입장에서 설득력 있는 입론을 작성해주세요. \
         명확한 입장 표명과 핵심 논거 두세 개를 포함해 150단어 이내로 작성하세요."
    )
}

/// LLM drafting prompt for a reply to the user's turn
pub fn reply_prompt(
    phase: DebatePhase,
    topic: &str,
    position: Position,
    user_text: &str,
    key_arguments: &[String],
) -> String {
    let stance = match position {
        Position::Pro => "찬성",
        Position::Con => "반대",
    };
    let goal = match phase {
        DebatePhase::Rebuttal => "상대방 논리의 약점을 지적하는 반론",
        DebatePhase::CounterRebuttal => "반박을 보강하는 재반론",
        DebatePhase::Closing => "토론을 정리하는 최종 변론",
        _ => "다음 발언",
    };
    let points = if key_arguments.is_empty() {
        "(없음)".to_string()
    } else {
        key_arguments.join(" / ")
    };
    format!(
        "토론 주제: {topic}\n당신의 입장: {stance}\n\n\
         상대방의 주장:\n\"{user_text}\"\n\n주요 논점: {points}\n\n\
         위 주장에 대한 {goal}을 정중하되 확고한 어조로 150단어 이내로 작성해주세요."
    )
}

/// Per-phase coaching line shown as the sample answer
pub fn sample_answer(phase: DebatePhase) -> &'static str {
    match phase {
        DebatePhase::Opening => {
            "더 강력한 근거와 통계 자료를 활용하면 더욱 설득력 있는 입론이 될 것입니다."
        }
        DebatePhase::Rebuttal => {
            "상대 주장의 핵심 전제를 짚고 구체적인 반례를 들어 반박하면 더욱 설득력이 있습니다."
        }
        DebatePhase::CounterRebuttal => {
            "앞선 반박을 보완하는 새로운 근거를 제시하면 재반론이 한층 강해집니다."
        }
        DebatePhase::Closing => {
            "핵심 논거를 요약하고 전망을 제시하며 마무리하면 좋은 인상을 남길 수 있습니다."
        }
        DebatePhase::Completed => {
            "구체적인 근거와 예시를 들어 논리적으로 설명하는 것이 좋습니다."
        }
    }
}

/// Interviewer avatar script: greeting plus the question, question-marked
pub fn interviewer_script(question: &str) -> String {
    let mut text = question.trim().to_string();
    let punctuated = text.ends_with('?')
        || text.ends_with('.')
        || text.ends_with('요')
        || text.ends_with('까');
    if !punctuated {
        text.push('?');
    }
    format!("안녕하세요. 면접에 참여해 주셔서 감사합니다. {text}")
}

/// Debater avatar script: phase greeting plus the utterance
pub fn debater_script(phase: DebatePhase, text: &str) -> String {
    let greeting = match phase {
        DebatePhase::Opening => "안녕하세요. 저는 다음과 같이 주장하겠습니다.",
        DebatePhase::Rebuttal => "상대측 주장에 대해 반박하겠습니다.",
        DebatePhase::CounterRebuttal => "추가로 반박 논리를 제시하겠습니다.",
        DebatePhase::Closing => "마지막으로 정리하자면 다음과 같습니다.",
        DebatePhase::Completed => "다음과 같이 말씀드리겠습니다.",
    };
    format!("{greeting} {}", text.trim())
}
