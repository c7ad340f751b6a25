//! Session protocol layer
//!
//! `store` keeps per-session state behind one async mutex, `templates` holds
//! the deterministic Korean question and utterance forms, and `orchestrator`
//! drives the end-to-end interview and debate flows over both.

pub mod orchestrator;
pub mod store;
pub mod templates;

pub use orchestrator::Orchestrator;
pub use store::SessionStore;
