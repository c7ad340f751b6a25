//! Session orchestration
//!
//! End-to-end flows behind the interview and debate endpoints: question
//! generation, clip evaluation, turn recording, AI reply production and
//! avatar rendering. Every adapter failure degrades to a deterministic
//! template or default, so an orchestrated flow always yields a full payload.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use crate::analysis::composer;
use crate::analysis::defaults;
use crate::analysis::feedback::debate_feedback;
use crate::analysis::{scoring, FusionEngine};
use crate::models::{
    CandidateProfile, DebatePhase, Gender, GeneratedQuestion, InterviewPhase, PhaseRecord,
    Position, Session, SessionDetail, SessionKind,
};
use crate::recommend::corpus::RARITY_TABLE;
use crate::recommend::tokenizer;
use crate::services::{AdapterSet, AvatarPipeline, IngestError, MediaIngest, Persona};
use crate::session::store::SessionStore;
use crate::session::templates;

const QUESTION_MAX_TOKENS: u32 = 200;
const UTTERANCE_MAX_TOKENS: u32 = 400;

/// Jaro-Winkler floor for recognizing a technology token in a transcript
const TOKEN_SIMILARITY_FLOOR: f64 = 0.92;

pub struct Orchestrator {
    adapters: Arc<AdapterSet>,
    ingest: Arc<MediaIngest>,
    fusion: FusionEngine,
    pipeline: Arc<AvatarPipeline>,
    store: Arc<SessionStore>,
}

impl Orchestrator {
    pub fn new(
        adapters: Arc<AdapterSet>,
        ingest: Arc<MediaIngest>,
        pipeline: Arc<AvatarPipeline>,
        store: Arc<SessionStore>,
    ) -> Self {
        let fusion = FusionEngine::new(adapters.clone());
        Self {
            adapters,
            ingest,
            fusion,
            pipeline,
            store,
        }
    }

    /// Draft the four-question interview plan and open the session
    pub async fn generate_questions(
        &self,
        interview_id: i64,
        profile: CandidateProfile,
    ) -> Vec<GeneratedQuestion> {
        let mut questions = Vec::with_capacity(InterviewPhase::QUESTION_SEQUENCE.len());
        for phase in InterviewPhase::QUESTION_SEQUENCE {
            let fallback = templates::fallback_question(phase, &profile);
            let text = self
                .complete_or(
                    Persona::Interviewer,
                    &templates::question_prompt(phase, &profile),
                    QUESTION_MAX_TOKENS,
                    fallback,
                )
                .await;
            questions.push(GeneratedQuestion {
                question_type: phase,
                question_text: text,
            });
        }
        self.store
            .insert(Session::new_interview(interview_id, profile, questions.clone()))
            .await;
        tracing::info!(interview_id, count = questions.len(), "Interview session opened");
        questions
    }

    /// Evaluate one interview answer clip and advance the session
    pub async fn process_interview_answer(
        &self,
        interview_id: i64,
        phase: InterviewPhase,
        bytes: &[u8],
    ) -> serde_json::Value {
        let session = self
            .store
            .ensure(interview_id, || {
                Session::new_interview(interview_id, CandidateProfile::default(), Vec::new())
            })
            .await;
        let current_label = session.current_phase_label();

        let media = match self.ingest.ingest(bytes, interview_id, phase.as_str()).await {
            Ok(media) => media,
            Err(IngestError::EmptyUpload) => {
                tracing::warn!(interview_id, phase = phase.as_str(), "No answer clip uploaded");
                return composer::interview_missing_file_payload(
                    interview_id,
                    phase.as_str(),
                    &current_label,
                );
            }
            Err(IngestError::Io(e)) => {
                tracing::error!(interview_id, phase = phase.as_str(), "Ingest failed: {}", e);
                return composer::interview_error_payload(
                    interview_id,
                    phase.as_str(),
                    &current_label,
                );
            }
        };

        let observation = self.fusion.fuse(&media, interview_id, phase.as_str()).await;
        drop(media);

        let scores = scoring::score(&observation);
        let mut feedback = debate_feedback(&scores);
        defaults::apply_degraded_feedback(&mut feedback, &observation);

        // A TECH answer that names a known technology earns a follow-up
        let followup_token = if phase == InterviewPhase::Tech {
            let profile = match &session.detail {
                SessionDetail::Interview(d) => d.profile.clone(),
                _ => CandidateProfile::default(),
            };
            detect_tech_token(&observation.transcript.text, &profile)
        } else {
            None
        };

        let record = PhaseRecord {
            phase: phase.as_str().to_string(),
            transcript_text: observation.transcript.text.clone(),
            observation,
            scores,
            feedback,
            ai_response_text: None,
            ai_video_path: None,
            recorded_at: Utc::now(),
        };
        let payload_record = record.clone();

        let next_label = self
            .store
            .mutate(interview_id, |session| {
                let submitted_current = session.current_phase_label() == phase.as_str();
                session.record_phase(record);
                if let Some(token) = &followup_token {
                    if let SessionDetail::Interview(d) = &mut session.detail {
                        d.followup_planned = true;
                        d.followup_token = Some(token.clone());
                    }
                }
                // Only the turn the session is waiting on moves it forward;
                // resubmissions re-record in place
                if submitted_current {
                    if let Some(transition) = session.advance_interview() {
                        tracing::info!(
                            session_id = transition.session_id,
                            from = %transition.old_phase,
                            to = %transition.new_phase,
                            "Interview advanced"
                        );
                    }
                }
                session.current_phase_label()
            })
            .await
            .unwrap_or_else(|| "completed".to_string());

        composer::interview_answer_payload(
            interview_id,
            phase.as_str(),
            &payload_record,
            &next_label,
        )
    }

    /// Draft the follow-up question from the TECH answer
    pub async fn generate_followup(&self, interview_id: i64, bytes: &[u8]) -> String {
        let session = self
            .store
            .ensure(interview_id, || {
                Session::new_interview(interview_id, CandidateProfile::default(), Vec::new())
            })
            .await;
        let profile = match &session.detail {
            SessionDetail::Interview(d) => d.profile.clone(),
            _ => CandidateProfile::default(),
        };

        // The token planned at TECH evaluation wins; otherwise transcribe the
        // uploaded clip and look again
        let mut token = match &session.detail {
            SessionDetail::Interview(d) => d.followup_token.clone(),
            _ => None,
        };
        let mut transcript_text = session
            .phase_record(InterviewPhase::Tech.as_str())
            .map(|r| r.transcript_text.clone())
            .unwrap_or_default();

        if token.is_none() && !bytes.is_empty() {
            match self.ingest.ingest(bytes, interview_id, "FOLLOWUP").await {
                Ok(media) => {
                    if let (Some(whisper), Some(audio)) =
                        (self.adapters.whisper.as_available(), media.audio_path())
                    {
                        match whisper.transcribe(audio, "ko").await {
                            Ok(transcript) => {
                                token = detect_tech_token(&transcript.text, &profile);
                                transcript_text = transcript.text;
                            }
                            Err(e) => {
                                tracing::warn!(
                                    interview_id,
                                    "Follow-up transcription failed: {}",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(interview_id, "Follow-up ingest failed: {}", e);
                }
            }
        }

        let question = match &token {
            Some(token) => {
                self.complete_or(
                    Persona::Interviewer,
                    &templates::followup_prompt(&transcript_text, token),
                    QUESTION_MAX_TOKENS,
                    templates::followup_fallback(token),
                )
                .await
            }
            None => templates::FOLLOWUP_GENERIC.to_string(),
        };

        // Remember the plan so TECH advances into FOLLOWUP
        if token.is_some() {
            self.store
                .mutate(interview_id, |session| {
                    if let SessionDetail::Interview(d) = &mut session.detail {
                        d.followup_planned = true;
                        d.followup_token = token.clone();
                    }
                })
                .await;
        }

        question
    }

    /// Open a debate session and produce the AI's opening statement
    pub async fn ai_opening(
        &self,
        debate_id: i64,
        topic: String,
        user_position: Position,
    ) -> String {
        let ai_position = user_position.opposite();
        let text = self
            .complete_or(
                Persona::Debater,
                &templates::opening_prompt(&topic, ai_position),
                UTTERANCE_MAX_TOKENS,
                templates::debate_fallback(DebatePhase::Opening, ai_position, &topic),
            )
            .await;

        let mut session = Session::new_debate(debate_id, topic, user_position);
        session.cache_ai_text(DebatePhase::Opening.as_str(), text.clone());
        self.store.insert(session).await;
        tracing::info!(
            debate_id,
            ai_position = ai_position.as_str(),
            "Debate session opened"
        );
        text
    }

    /// Evaluate one debate turn and produce the AI reply for the next phase
    pub async fn process_debate_phase(
        &self,
        debate_id: i64,
        phase: DebatePhase,
        bytes: &[u8],
    ) -> serde_json::Value {
        let session = self
            .store
            .ensure(debate_id, || {
                Session::new_debate(
                    debate_id,
                    templates::DEFAULT_TOPIC.to_string(),
                    Position::Pro,
                )
            })
            .await;
        let (topic, ai_position) = match &session.detail {
            SessionDetail::Debate(d) => (d.topic.clone(), d.ai_position),
            _ => (templates::DEFAULT_TOPIC.to_string(), Position::Con),
        };
        let current_label = session.current_phase_label();
        let reply_phase = phase.next().filter(|p| *p != DebatePhase::Completed);

        let media = match self.ingest.ingest(bytes, debate_id, phase.as_str()).await {
            Ok(media) => media,
            Err(e) => {
                // Defaults still carry a template reply; nothing is recorded
                // and the session stays where it was
                let ai_text =
                    reply_phase.map(|p| (p, templates::debate_fallback(p, ai_position, &topic)));
                let ai_next = ai_text.as_ref().map(|(p, t)| (*p, t.as_str()));
                return match e {
                    IngestError::EmptyUpload => {
                        tracing::warn!(debate_id, phase = phase.as_str(), "No debate clip uploaded");
                        composer::debate_missing_file_payload(
                            debate_id,
                            &topic,
                            phase,
                            ai_next,
                            &current_label,
                        )
                    }
                    IngestError::Io(io) => {
                        tracing::error!(debate_id, phase = phase.as_str(), "Ingest failed: {}", io);
                        composer::debate_error_payload(
                            debate_id,
                            &topic,
                            phase,
                            ai_next,
                            &current_label,
                        )
                    }
                };
            }
        };

        let observation = self.fusion.fuse(&media, debate_id, phase.as_str()).await;
        drop(media);

        let scores = scoring::score(&observation);
        let mut feedback = debate_feedback(&scores);
        feedback.sample_answer = templates::sample_answer(phase).to_string();
        defaults::apply_degraded_feedback(&mut feedback, &observation);

        // A reply cached for the next phase is only valid for the clip it
        // answered; resubmission regenerates
        let is_resubmission = session.phase_record(phase.as_str()).is_some();
        let ai_text = match reply_phase {
            Some(reply) => {
                let cached = if is_resubmission {
                    None
                } else {
                    session.cached_ai_text(reply.as_str()).map(str::to_string)
                };
                let text = match cached {
                    Some(text) => text,
                    None => {
                        self.complete_or(
                            Persona::Debater,
                            &templates::reply_prompt(
                                reply,
                                &topic,
                                ai_position,
                                &observation.transcript.text,
                                &observation.key_arguments,
                            ),
                            UTTERANCE_MAX_TOKENS,
                            templates::debate_fallback(reply, ai_position, &topic),
                        )
                        .await
                    }
                };
                Some((reply, text))
            }
            None => None,
        };

        let record = PhaseRecord {
            phase: phase.as_str().to_string(),
            transcript_text: observation.transcript.text.clone(),
            observation,
            scores,
            feedback,
            ai_response_text: ai_text.as_ref().map(|(_, t)| t.clone()),
            ai_video_path: None,
            recorded_at: Utc::now(),
        };
        let payload_record = record.clone();

        let next_label = self
            .store
            .mutate(debate_id, |session| {
                let submitted_current = session.current_phase_label() == phase.as_str();
                session.record_phase(record);
                if let Some((reply, text)) = &ai_text {
                    session.cache_ai_text(reply.as_str(), text.clone());
                }
                if submitted_current {
                    if let Some(transition) = session.advance_debate() {
                        tracing::info!(
                            session_id = transition.session_id,
                            from = %transition.old_phase,
                            to = %transition.new_phase,
                            "Debate advanced"
                        );
                    }
                }
                session.current_phase_label()
            })
            .await
            .unwrap_or_else(|| DebatePhase::Completed.as_str().to_string());

        let ai_next = ai_text.as_ref().map(|(p, t)| (*p, t.as_str()));
        composer::debate_phase_payload(
            debate_id,
            &topic,
            phase,
            &payload_record,
            ai_next,
            &next_label,
        )
    }

    /// Render the interviewer avatar clip for a question
    pub async fn render_interviewer(
        &self,
        question: &str,
        gender: Gender,
    ) -> std::io::Result<PathBuf> {
        let script = templates::interviewer_script(question);
        self.pipeline
            .render_and_cache(&script, SessionKind::Interview, gender, "question")
            .await
    }

    /// Render the debater avatar clip for a phase utterance
    pub async fn render_debater(
        &self,
        phase: DebatePhase,
        text: &str,
        gender: Gender,
    ) -> std::io::Result<PathBuf> {
        let script = templates::debater_script(phase, text);
        self.pipeline
            .render_and_cache(&script, SessionKind::Debate, gender, phase.as_str())
            .await
    }

    /// LLM completion with template fallback; never errors
    async fn complete_or(
        &self,
        persona: Persona,
        prompt: &str,
        max_tokens: u32,
        fallback: String,
    ) -> String {
        let Some(llm) = self.adapters.llm.as_available() else {
            return fallback;
        };
        match llm.complete(persona, prompt, max_tokens).await {
            Ok(text) => {
                let text = normalize_utterance(&text);
                if text.is_empty() {
                    fallback
                } else {
                    text
                }
            }
            Err(e) => {
                tracing::warn!("LLM completion failed, using template: {}", e);
                fallback
            }
        }
    }
}

/// Strip wrapping quotes and stray whitespace from a model completion
fn normalize_utterance(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '\u{201c}' || c == '\u{201d}')
        .trim()
        .to_string()
}

/// Find a known technology token in the transcript.
///
/// The vocabulary is the candidate's own stack plus the rare-skill table;
/// matching is fuzzy so near-miss STT spellings still hit.
pub(crate) fn detect_tech_token(transcript: &str, profile: &CandidateProfile) -> Option<String> {
    let mut vocabulary = profile.tech_tokens();
    let mut table_keys: Vec<&str> = RARITY_TABLE.keys().copied().collect();
    table_keys.sort_unstable();
    for key in table_keys {
        if !vocabulary.iter().any(|t| t == key) {
            vocabulary.push(key.to_string());
        }
    }

    for word in tokenizer::words(transcript) {
        for candidate in &vocabulary {
            if strsim::jaro_winkler(&word, candidate) >= TOKEN_SIMILARITY_FLOOR {
                return Some(candidate.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::defaults::{MISSING_FILE_TEXT, MISSING_FILE_SCORE};
    use crate::services::{AcousticAnalyzer, ResponseCache};
    use crate::types::Capability;
    use std::path::Path;

    fn offline_orchestrator(root: &Path) -> Orchestrator {
        let adapters = Arc::new(AdapterSet {
            ffmpeg: Capability::from_probe("transcoder", Err("offline".to_string())),
            whisper: Capability::from_probe("stt", Err("offline".to_string())),
            openface: Capability::from_probe("facial", Err("offline".to_string())),
            acoustic: Capability::from_probe("acoustic", Ok(Arc::new(AcousticAnalyzer::new()))),
            llm: Capability::from_probe("llm", Err("offline".to_string())),
            avatar: Capability::from_probe("avatar", Err("offline".to_string())),
        });
        let ingest = Arc::new(MediaIngest::new(root.join("tmp"), None));
        let pipeline = Arc::new(AvatarPipeline::new(
            root.join("cache"),
            root.join("samples"),
            None,
            Arc::new(ResponseCache::new()),
        ));
        Orchestrator::new(adapters, ingest, pipeline, Arc::new(SessionStore::new()))
    }

    fn minimal_mp4() -> Vec<u8> {
        let mut bytes = vec![0, 0, 0, 16];
        bytes.extend_from_slice(b"ftypisom");
        bytes.extend_from_slice(&[0, 0, 0, 1]);
        bytes
    }

    fn tech_profile() -> CandidateProfile {
        CandidateProfile {
            job_category: "백엔드 개발".to_string(),
            workexperience: "3년".to_string(),
            tech_stack: "Rust, Kafka".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn offline_question_generation_uses_templates() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());

        let questions = orchestrator.generate_questions(1, tech_profile()).await;
        assert_eq!(questions.len(), 4);
        assert_eq!(questions[0].question_type, InterviewPhase::Intro);
        assert_eq!(questions[3].question_type, InterviewPhase::Tech);
        assert!(questions[0].question_text.contains("백엔드 개발"));
        assert!(questions[3].question_text.contains("Rust, Kafka"));

        let session = orchestrator.store.snapshot(1).await.unwrap();
        assert_eq!(session.current_phase_label(), "INTRO");
    }

    #[tokio::test]
    async fn empty_interview_upload_returns_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());
        orchestrator.generate_questions(2, tech_profile()).await;

        let payload = orchestrator
            .process_interview_answer(2, InterviewPhase::Intro, &[])
            .await;
        assert_eq!(payload["answer_text"], MISSING_FILE_TEXT);
        assert_eq!(payload["content_score"], MISSING_FILE_SCORE);
        // Nothing recorded, nothing advanced
        assert_eq!(payload["next_phase"], "INTRO");
        let session = orchestrator.store.snapshot(2).await.unwrap();
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn offline_answer_degrades_but_advances() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());
        orchestrator.generate_questions(3, tech_profile()).await;

        let payload = orchestrator
            .process_interview_answer(3, InterviewPhase::Intro, &minimal_mp4())
            .await;
        // All three analyzers offline: every axis sits in the failure band
        for field in ["content_score", "voice_score", "action_score"] {
            let value = payload[field].as_f64().unwrap();
            assert!((2.0..=3.0).contains(&value), "{field} = {value}");
        }
        assert_eq!(payload["answer_text"], composer::NO_SPEECH_TEXT);
        assert_eq!(payload["next_phase"], "FIT");

        let session = orchestrator.store.snapshot(3).await.unwrap();
        assert_eq!(session.current_phase_label(), "FIT");
        assert_eq!(session.history.len(), 1);
    }

    #[tokio::test]
    async fn answer_for_unknown_session_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());

        let payload = orchestrator
            .process_interview_answer(77, InterviewPhase::Intro, &minimal_mp4())
            .await;
        assert_eq!(payload["interview_id"], 77);
        assert!(orchestrator.store.snapshot(77).await.is_some());
    }

    #[tokio::test]
    async fn resubmission_rerecords_without_advancing() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());
        orchestrator.generate_questions(4, tech_profile()).await;

        orchestrator
            .process_interview_answer(4, InterviewPhase::Intro, &minimal_mp4())
            .await;
        let payload = orchestrator
            .process_interview_answer(4, InterviewPhase::Intro, &minimal_mp4())
            .await;
        // Second INTRO clip: still one record, session stays at FIT
        assert_eq!(payload["next_phase"], "FIT");
        let session = orchestrator.store.snapshot(4).await.unwrap();
        assert_eq!(session.history.len(), 1);
        assert_eq!(session.current_phase_label(), "FIT");
    }

    #[tokio::test]
    async fn offline_followup_is_generic() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());
        orchestrator.generate_questions(5, tech_profile()).await;

        let question = orchestrator.generate_followup(5, &minimal_mp4()).await;
        assert_eq!(question, templates::FOLLOWUP_GENERIC);
    }

    #[tokio::test]
    async fn planned_token_drives_the_followup() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());
        orchestrator.generate_questions(6, tech_profile()).await;
        orchestrator
            .store
            .mutate(6, |session| {
                if let SessionDetail::Interview(d) = &mut session.detail {
                    d.followup_token = Some("kafka".to_string());
                }
            })
            .await;

        let question = orchestrator.generate_followup(6, &[]).await;
        assert!(question.contains("'kafka'"));
    }

    #[tokio::test]
    async fn ai_opening_takes_the_opposite_position() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());

        let text = orchestrator
            .ai_opening(10, "원격 근무 확대".to_string(), Position::Pro)
            .await;
        // AI argues CON: the cautious template
        assert!(text.contains("신중한"));
        assert!(text.contains("원격 근무 확대"));

        let session = orchestrator.store.snapshot(10).await.unwrap();
        assert_eq!(session.cached_ai_text("opening"), Some(text.as_str()));
    }

    #[tokio::test]
    async fn debate_turn_carries_reply_and_advances() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());
        orchestrator
            .ai_opening(11, "인공지능 규제".to_string(), Position::Pro)
            .await;

        let payload = orchestrator
            .process_debate_phase(11, DebatePhase::Opening, &minimal_mp4())
            .await;
        assert_eq!(payload["debate_id"], 11);
        assert_eq!(payload["topic"], "인공지능 규제");
        assert!(payload.get("user_opening_text").is_some());
        let reply = payload["ai_rebuttal_text"].as_str().unwrap();
        assert!(reply.contains("인공지능 규제"));
        assert_eq!(payload["next_phase"], "rebuttal");

        let session = orchestrator.store.snapshot(11).await.unwrap();
        assert_eq!(session.current_phase_label(), "rebuttal");
        assert_eq!(session.cached_ai_text("rebuttal"), Some(reply));
    }

    #[tokio::test]
    async fn closing_turn_completes_without_reply() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());
        orchestrator
            .ai_opening(12, "주제".to_string(), Position::Con)
            .await;
        for phase in [
            DebatePhase::Opening,
            DebatePhase::Rebuttal,
            DebatePhase::CounterRebuttal,
        ] {
            orchestrator
                .process_debate_phase(12, phase, &minimal_mp4())
                .await;
        }

        let payload = orchestrator
            .process_debate_phase(12, DebatePhase::Closing, &minimal_mp4())
            .await;
        assert_eq!(payload["next_phase"], "completed");
        assert!(payload.get("ai_completed_text").is_none());

        let session = orchestrator.store.snapshot(12).await.unwrap();
        assert!(session.is_completed());
    }

    #[tokio::test]
    async fn debate_upload_without_opening_call_still_works() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());

        let payload = orchestrator
            .process_debate_phase(13, DebatePhase::Opening, &minimal_mp4())
            .await;
        assert_eq!(payload["topic"], templates::DEFAULT_TOPIC);
        assert!(payload.get("ai_rebuttal_text").is_some());
    }

    #[tokio::test]
    async fn missing_debate_clip_keeps_the_session_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());
        orchestrator
            .ai_opening(14, "주제".to_string(), Position::Pro)
            .await;

        let payload = orchestrator
            .process_debate_phase(14, DebatePhase::Opening, &[])
            .await;
        assert_eq!(payload["user_opening_text"], MISSING_FILE_TEXT);
        assert_eq!(payload["next_phase"], "opening");
        assert!(payload.get("ai_rebuttal_text").is_some());

        let session = orchestrator.store.snapshot(14).await.unwrap();
        assert_eq!(session.current_phase_label(), "opening");
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn avatar_rendering_works_without_a_provider() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = offline_orchestrator(dir.path());

        let clip = orchestrator
            .render_interviewer("자기소개를 해주세요.", Gender::Female)
            .await
            .unwrap();
        assert!(clip.exists());

        let debater = orchestrator
            .render_debater(DebatePhase::Rebuttal, "반박합니다.", Gender::Male)
            .await
            .unwrap();
        assert!(debater.exists());
        assert_ne!(clip, debater);
    }

    #[test]
    fn tech_token_detection_is_fuzzy() {
        let profile = tech_profile();
        assert_eq!(
            detect_tech_token("저는 kafka 기반 파이프라인을 운영했습니다", &profile),
            Some("kafka".to_string())
        );
        // Close STT spelling still matches
        assert_eq!(
            detect_tech_token("pytorc 모델을 학습시켰습니다", &profile),
            Some("pytorch".to_string())
        );
        assert_eq!(detect_tech_token("특별한 기술 언급 없음", &profile), None);
        assert_eq!(detect_tech_token("", &profile), None);
    }

    #[test]
    fn utterance_normalization_strips_quotes() {
        assert_eq!(normalize_utterance("  \"질문입니다?\"  "), "질문입니다?");
        assert_eq!(normalize_utterance("답변"), "답변");
        assert_eq!(normalize_utterance("  "), "");
    }
}
