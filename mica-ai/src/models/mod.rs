//! Domain models for the coaching pipeline

pub mod observation;
pub mod posting;
pub mod scores;
pub mod session;

pub use observation::{
    AcousticSummary, Emotion, FacialSummary, MultimodalObservation, Transcript, TranscriptSegment,
    WordTimestamp,
};
pub use posting::{Category, JobPosting, UserProfile};
pub use scores::{round_score, Axis, ScoreFeedback, ScoreVector};
pub use session::{
    CandidateProfile, DebatePhase, Gender, GeneratedQuestion, InterviewPhase, PhaseRecord,
    Position, Session, SessionDetail, SessionKind, SessionStatus, StateTransition,
};
