//! Session protocol state machines
//!
//! Interview: start → INTRO → FIT → PERSONALITY → TECH → (FOLLOWUP)? → completed
//! Debate:    start → opening → rebuttal → counter_rebuttal → closing → completed,
//!            the AI speaking first in each phase.
//!
//! Phase labels and question types are ASCII identifiers; localized text lives
//! only in feedback and utterance strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{MultimodalObservation, ScoreFeedback, ScoreVector};

/// Session kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Interview,
    Debate,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Interview => "interview",
            SessionKind::Debate => "debate",
        }
    }
}

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Requested avatar gender
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Interview question progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterviewPhase {
    Intro,
    Fit,
    Personality,
    Tech,
    Followup,
}

impl InterviewPhase {
    /// The four generated question types, in canonical order
    pub const QUESTION_SEQUENCE: [InterviewPhase; 4] = [
        InterviewPhase::Intro,
        InterviewPhase::Fit,
        InterviewPhase::Personality,
        InterviewPhase::Tech,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewPhase::Intro => "INTRO",
            InterviewPhase::Fit => "FIT",
            InterviewPhase::Personality => "PERSONALITY",
            InterviewPhase::Tech => "TECH",
            InterviewPhase::Followup => "FOLLOWUP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "INTRO" => Some(InterviewPhase::Intro),
            "FIT" => Some(InterviewPhase::Fit),
            "PERSONALITY" => Some(InterviewPhase::Personality),
            "TECH" => Some(InterviewPhase::Tech),
            "FOLLOWUP" => Some(InterviewPhase::Followup),
            _ => None,
        }
    }

    /// Next phase; FOLLOWUP is entered only when planned
    pub fn next(&self, followup_planned: bool) -> Option<InterviewPhase> {
        match self {
            InterviewPhase::Intro => Some(InterviewPhase::Fit),
            InterviewPhase::Fit => Some(InterviewPhase::Personality),
            InterviewPhase::Personality => Some(InterviewPhase::Tech),
            InterviewPhase::Tech => {
                if followup_planned {
                    Some(InterviewPhase::Followup)
                } else {
                    None
                }
            }
            InterviewPhase::Followup => None,
        }
    }

    /// Ordinal for resubmission invalidation
    fn ordinal(&self) -> usize {
        match self {
            InterviewPhase::Intro => 0,
            InterviewPhase::Fit => 1,
            InterviewPhase::Personality => 2,
            InterviewPhase::Tech => 3,
            InterviewPhase::Followup => 4,
        }
    }
}

/// Debate phase progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    Opening,
    Rebuttal,
    CounterRebuttal,
    Closing,
    Completed,
}

impl DebatePhase {
    pub const SEQUENCE: [DebatePhase; 4] = [
        DebatePhase::Opening,
        DebatePhase::Rebuttal,
        DebatePhase::CounterRebuttal,
        DebatePhase::Closing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DebatePhase::Opening => "opening",
            DebatePhase::Rebuttal => "rebuttal",
            DebatePhase::CounterRebuttal => "counter_rebuttal",
            DebatePhase::Closing => "closing",
            DebatePhase::Completed => "completed",
        }
    }

    /// Parse the hyphenated URL segment ("counter-rebuttal")
    pub fn parse_path_segment(s: &str) -> Option<Self> {
        match s {
            "opening" => Some(DebatePhase::Opening),
            "rebuttal" => Some(DebatePhase::Rebuttal),
            "counter-rebuttal" | "counter_rebuttal" => Some(DebatePhase::CounterRebuttal),
            "closing" => Some(DebatePhase::Closing),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<DebatePhase> {
        match self {
            DebatePhase::Opening => Some(DebatePhase::Rebuttal),
            DebatePhase::Rebuttal => Some(DebatePhase::CounterRebuttal),
            DebatePhase::CounterRebuttal => Some(DebatePhase::Closing),
            DebatePhase::Closing => Some(DebatePhase::Completed),
            DebatePhase::Completed => None,
        }
    }

    fn ordinal(&self) -> usize {
        match self {
            DebatePhase::Opening => 0,
            DebatePhase::Rebuttal => 1,
            DebatePhase::CounterRebuttal => 2,
            DebatePhase::Closing => 3,
            DebatePhase::Completed => 4,
        }
    }
}

/// Debate position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Pro,
    Con,
}

impl Position {
    pub fn opposite(&self) -> Position {
        match self {
            Position::Pro => Position::Con,
            Position::Con => Position::Pro,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Pro => "PRO",
            Position::Con => "CON",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PRO" => Some(Position::Pro),
            "CON" => Some(Position::Con),
            _ => None,
        }
    }
}

/// Candidate profile captured at question generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub job_category: String,
    pub workexperience: String,
    pub education: String,
    pub tech_stack: String,
    pub personality: String,
    pub experience_description: String,
}

impl CandidateProfile {
    /// Comma-separated tech stack, trimmed and lowercased
    pub fn tech_tokens(&self) -> Vec<String> {
        self.tech_stack
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// One generated interview question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question_type: InterviewPhase,
    pub question_text: String,
}

/// One completed turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRecord {
    /// ASCII phase label ("INTRO", "opening", ...)
    pub phase: String,
    pub transcript_text: String,
    pub observation: MultimodalObservation,
    pub scores: ScoreVector,
    pub feedback: ScoreFeedback,
    /// AI utterance emitted in reply to this turn, if any
    pub ai_response_text: Option<String>,
    /// Rendered avatar clip for the AI utterance, if any
    pub ai_video_path: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// State transition record, for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: i64,
    pub old_phase: String,
    pub new_phase: String,
    pub transitioned_at: DateTime<Utc>,
}

/// Interview-specific session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewDetail {
    pub profile: CandidateProfile,
    pub questions: Vec<GeneratedQuestion>,
    pub current: InterviewPhase,
    /// Set when the TECH answer contained a known technology token
    pub followup_planned: bool,
    /// Tech token that triggered the follow-up
    pub followup_token: Option<String>,
}

/// Debate-specific session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateDetail {
    pub topic: String,
    pub user_position: Position,
    pub ai_position: Position,
    pub current: DebatePhase,
    /// At most one cached AI utterance per phase
    pub ai_texts: BTreeMap<String, String>,
}

/// Kind-specific session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionDetail {
    Interview(InterviewDetail),
    Debate(DebateDetail),
}

/// Per-session protocol state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub kind: SessionKind,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    /// Ordered history of completed turns
    pub history: Vec<PhaseRecord>,
    pub detail: SessionDetail,
}

impl Session {
    pub fn new_interview(
        id: i64,
        profile: CandidateProfile,
        questions: Vec<GeneratedQuestion>,
    ) -> Self {
        Self {
            id,
            kind: SessionKind::Interview,
            status: SessionStatus::Active,
            created_at: Utc::now(),
            history: Vec::new(),
            detail: SessionDetail::Interview(InterviewDetail {
                profile,
                questions,
                current: InterviewPhase::Intro,
                followup_planned: false,
                followup_token: None,
            }),
        }
    }

    pub fn new_debate(id: i64, topic: String, user_position: Position) -> Self {
        Self {
            id,
            kind: SessionKind::Debate,
            status: SessionStatus::Active,
            created_at: Utc::now(),
            history: Vec::new(),
            detail: SessionDetail::Debate(DebateDetail {
                topic,
                user_position,
                ai_position: user_position.opposite(),
                current: DebatePhase::Opening,
                ai_texts: BTreeMap::new(),
            }),
        }
    }

    /// Current phase label ("completed" once terminal)
    pub fn current_phase_label(&self) -> String {
        if self.status == SessionStatus::Completed {
            return "completed".to_string();
        }
        match &self.detail {
            SessionDetail::Interview(d) => d.current.as_str().to_string(),
            SessionDetail::Debate(d) => d.current.as_str().to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Record (or replace) the turn for a phase.
    ///
    /// Replacing an existing record invalidates every AI utterance cached for
    /// that phase or later: they were generated in reply to the prior clip.
    pub fn record_phase(&mut self, record: PhaseRecord) {
        let phase = record.phase.clone();
        if let Some(existing) = self.history.iter_mut().find(|r| r.phase == phase) {
            *existing = record;
            self.invalidate_ai_from(&phase);
        } else {
            self.history.push(record);
        }
    }

    pub fn phase_record(&self, phase: &str) -> Option<&PhaseRecord> {
        self.history.iter().find(|r| r.phase == phase)
    }

    /// Advance the interview to the next phase (or complete)
    pub fn advance_interview(&mut self) -> Option<StateTransition> {
        let id = self.id;
        let SessionDetail::Interview(detail) = &mut self.detail else {
            return None;
        };
        let old = detail.current;
        match old.next(detail.followup_planned) {
            Some(next) => {
                detail.current = next;
                Some(StateTransition {
                    session_id: id,
                    old_phase: old.as_str().to_string(),
                    new_phase: next.as_str().to_string(),
                    transitioned_at: Utc::now(),
                })
            }
            None => {
                self.status = SessionStatus::Completed;
                Some(StateTransition {
                    session_id: id,
                    old_phase: old.as_str().to_string(),
                    new_phase: "completed".to_string(),
                    transitioned_at: Utc::now(),
                })
            }
        }
    }

    /// Advance the debate to the next phase (or complete)
    pub fn advance_debate(&mut self) -> Option<StateTransition> {
        let id = self.id;
        let SessionDetail::Debate(detail) = &mut self.detail else {
            return None;
        };
        let old = detail.current;
        let next = old.next()?;
        detail.current = next;
        if next == DebatePhase::Completed {
            self.status = SessionStatus::Completed;
        }
        Some(StateTransition {
            session_id: id,
            old_phase: old.as_str().to_string(),
            new_phase: next.as_str().to_string(),
            transitioned_at: Utc::now(),
        })
    }

    /// Cached AI utterance for a phase, if one was generated under the
    /// current submissions
    pub fn cached_ai_text(&self, phase: &str) -> Option<&str> {
        match &self.detail {
            SessionDetail::Debate(d) => d.ai_texts.get(phase).map(String::as_str),
            SessionDetail::Interview(_) => None,
        }
    }

    pub fn cache_ai_text(&mut self, phase: &str, text: String) {
        if let SessionDetail::Debate(d) = &mut self.detail {
            d.ai_texts.insert(phase.to_string(), text);
        }
    }

    /// Drop cached AI utterances for `phase` and everything after it
    fn invalidate_ai_from(&mut self, phase: &str) {
        if let SessionDetail::Debate(d) = &mut self.detail {
            let Some(from) = DebatePhase::parse_path_segment(phase) else {
                return;
            };
            d.ai_texts.retain(|label, _| {
                DebatePhase::parse_path_segment(label)
                    .map(|p| p.ordinal() < from.ordinal())
                    .unwrap_or(false)
            });
        } else if let SessionDetail::Interview(d) = &mut self.detail {
            // Resubmitting TECH (or earlier) invalidates the planned follow-up
            if let Some(from) = InterviewPhase::parse(phase) {
                if from.ordinal() <= InterviewPhase::Tech.ordinal() {
                    d.followup_planned = false;
                    d.followup_token = None;
                }
            }
        }
    }
}
