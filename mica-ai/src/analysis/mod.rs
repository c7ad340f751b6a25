//! Multimodal analysis pipeline
//!
//! `fusion` runs the per-clip analyzers (facial and acoustic in parallel,
//! speech-to-text serial) and merges their outputs into one
//! MultimodalObservation. `scoring` maps an observation onto the seven-axis
//! ScoreVector, `feedback` renders the score-driven Korean strings, and
//! `composer`/`defaults` produce the fixed endpoint payloads.

pub mod composer;
pub mod defaults;
pub mod feedback;
pub mod fusion;
pub mod scoring;

pub use feedback::{debate_feedback, interview_feedback, Bucket, InterviewFeedback};
pub use fusion::FusionEngine;
pub use scoring::score;
