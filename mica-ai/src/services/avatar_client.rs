//! Avatar adapter (talks API)
//!
//! Create → poll → download against a D-ID-shape provider. The poll loop is an
//! explicit `Created → Started → (Done | Error)` state machine with a hard
//! elapsed budget; a Done payload with zero duration or zero frames counts as
//! a render failure so callers fall back to sample clips.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::{AVATAR_MAX_ELAPSED_SECS, AVATAR_POLL_INTERVAL_SECS};
use crate::models::{Gender, SessionKind};

/// Timeout for the create and status requests
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for the result download
const DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Provider create-call rate limit
const CREATES_PER_SECOND: u32 = 2;

/// Avatar client errors
#[derive(Debug, Error)]
pub enum AvatarError {
    /// Provider endpoint or key not configured
    #[error("Avatar provider not configured")]
    NotConfigured,

    /// HTTP request failed
    #[error("Avatar request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("Avatar API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Provider reported the render as failed, or the result was unusable
    #[error("Avatar render failed: {0}")]
    RenderFailed(String),

    /// Elapsed budget exhausted while polling
    #[error("Avatar render timed out after {0} seconds")]
    Timeout(u64),
}

/// Persona selects the presenter image and TTS voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarPersona {
    InterviewerMale,
    InterviewerFemale,
    DebaterMale,
    DebaterFemale,
}

impl AvatarPersona {
    pub fn select(kind: SessionKind, gender: Gender) -> Self {
        match (kind, gender) {
            (SessionKind::Interview, Gender::Male) => AvatarPersona::InterviewerMale,
            (SessionKind::Interview, Gender::Female) => AvatarPersona::InterviewerFemale,
            (SessionKind::Debate, Gender::Male) => AvatarPersona::DebaterMale,
            (SessionKind::Debate, Gender::Female) => AvatarPersona::DebaterFemale,
        }
    }

    /// Korean neural TTS voice for this persona
    pub fn voice_id(&self) -> &'static str {
        match self {
            AvatarPersona::InterviewerMale => "ko-KR-Neural2-B",
            AvatarPersona::InterviewerFemale => "ko-KR-Neural2-A",
            AvatarPersona::DebaterMale => "ko-KR-Neural2-D",
            AvatarPersona::DebaterFemale => "ko-KR-Neural2-C",
        }
    }

    /// Stock presenter image
    pub fn presenter_url(&self) -> &'static str {
        match self {
            AvatarPersona::InterviewerMale => {
                "https://create-images-results.d-id.com/DefaultPresenters/Noam_front_thumbnail.jpg"
            }
            AvatarPersona::InterviewerFemale => {
                "https://create-images-results.d-id.com/DefaultPresenters/Maya_front_thumbnail.jpg"
            }
            AvatarPersona::DebaterMale => {
                "https://create-images-results.d-id.com/DefaultPresenters/David_front_thumbnail.jpg"
            }
            AvatarPersona::DebaterFemale => {
                "https://create-images-results.d-id.com/DefaultPresenters/Sarah_front_thumbnail.jpg"
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarPersona::InterviewerMale => "interviewer_male",
            AvatarPersona::InterviewerFemale => "interviewer_female",
            AvatarPersona::DebaterMale => "debater_male",
            AvatarPersona::DebaterFemale => "debater_female",
        }
    }
}

/// Provider-side render state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Created,
    Started,
    Done,
    Error,
}

impl PollState {
    /// Unknown states are None; the poll loop keeps waiting on them
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(PollState::Created),
            "started" => Some(PollState::Started),
            "done" => Some(PollState::Done),
            "error" | "rejected" => Some(PollState::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct TalkRequest {
    script: TalkScript,
    config: TalkConfig,
    source_url: String,
}

#[derive(Debug, Serialize)]
struct TalkScript {
    #[serde(rename = "type")]
    script_type: &'static str,
    subtitles: &'static str,
    provider: TalkProvider,
    ssml: &'static str,
    input: String,
}

#[derive(Debug, Serialize)]
struct TalkProvider {
    #[serde(rename = "type")]
    provider_type: &'static str,
    voice_id: &'static str,
}

#[derive(Debug, Serialize)]
struct TalkConfig {
    fluent: &'static str,
    pad_audio: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TalkCreated {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TalkStatus {
    pub status: String,
    pub result_url: Option<String>,
    pub duration: Option<f64>,
    pub metadata: Option<TalkMetadata>,
    pub error: Option<TalkErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TalkMetadata {
    pub num_frames: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TalkErrorBody {
    pub description: Option<String>,
}

/// Avatar render client
pub struct AvatarClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: String,
    create_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl AvatarClient {
    /// Create a client; fails when the provider is not configured
    pub fn new(base_url: Option<&str>, api_key: Option<&str>) -> Result<Self, AvatarError> {
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or(AvatarError::NotConfigured)?;
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AvatarError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let per_second =
            std::num::NonZeroU32::new(CREATES_PER_SECOND).unwrap_or(std::num::NonZeroU32::MIN);
        let create_limiter = governor::RateLimiter::direct(governor::Quota::per_second(per_second));

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: basic_auth_value(api_key),
            create_limiter,
        })
    }

    /// Render a talking-head clip and return the MP4 bytes
    pub async fn render(&self, script: &str, persona: AvatarPersona) -> Result<Vec<u8>, AvatarError> {
        let talk_id = self.create_talk(script, persona).await?;
        tracing::info!(talk_id = %talk_id, persona = persona.as_str(), "Avatar render started");

        let result_url = self.poll_until_done(&talk_id).await?;
        self.download(&result_url).await
    }

    async fn create_talk(&self, script: &str, persona: AvatarPersona) -> Result<String, AvatarError> {
        self.create_limiter.until_ready().await;

        let request = TalkRequest {
            script: TalkScript {
                script_type: "text",
                subtitles: "false",
                provider: TalkProvider {
                    provider_type: "microsoft",
                    voice_id: persona.voice_id(),
                },
                ssml: "false",
                input: script.to_string(),
            },
            config: TalkConfig {
                fluent: "false",
                pad_audio: "0.0",
            },
            source_url: persona.presenter_url().to_string(),
        };

        let response = self
            .client
            .post(format!("{}/talks", self.base_url))
            .header("Authorization", &self.auth_header)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AvatarError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let created: TalkCreated = response.json().await?;
        Ok(created.id)
    }

    /// Poll the talk until Done, Error, or budget exhaustion
    async fn poll_until_done(&self, talk_id: &str) -> Result<String, AvatarError> {
        let started = Instant::now();
        let poll_interval = Duration::from_secs(AVATAR_POLL_INTERVAL_SECS);

        loop {
            if started.elapsed() >= Duration::from_secs(AVATAR_MAX_ELAPSED_SECS) {
                return Err(AvatarError::Timeout(AVATAR_MAX_ELAPSED_SECS));
            }

            match self.fetch_status(talk_id).await {
                Ok(talk) => {
                    let state = PollState::parse(&talk.status);
                    tracing::debug!(
                        talk_id = %talk_id,
                        status = %talk.status,
                        elapsed_secs = started.elapsed().as_secs(),
                        "Avatar poll"
                    );
                    match state {
                        Some(PollState::Done) => return done_result(talk),
                        Some(PollState::Error) => {
                            let description = talk
                                .error
                                .and_then(|e| e.description)
                                .unwrap_or_else(|| "unknown provider error".to_string());
                            return Err(AvatarError::RenderFailed(description));
                        }
                        // Created, Started, or an unknown state: keep waiting
                        _ => {}
                    }
                }
                Err(e) => {
                    // Transient status failures do not abort the render
                    tracing::warn!(talk_id = %talk_id, "Avatar status check failed: {}", e);
                }
            }

            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn fetch_status(&self, talk_id: &str) -> Result<TalkStatus, AvatarError> {
        let response = self
            .client
            .get(format!("{}/talks/{}", self.base_url, talk_id))
            .header("Authorization", &self.auth_header)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AvatarError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, AvatarError> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AvatarError::ApiError {
                status: status.as_u16(),
                message: "result download failed".to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Validate a Done payload and extract its result URL
fn done_result(talk: TalkStatus) -> Result<String, AvatarError> {
    if talk.duration.unwrap_or(0.0) <= 0.0 {
        return Err(AvatarError::RenderFailed("zero-duration result".to_string()));
    }
    if talk.metadata.as_ref().and_then(|m| m.num_frames) == Some(0) {
        return Err(AvatarError::RenderFailed("zero-frame result".to_string()));
    }
    talk.result_url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AvatarError::RenderFailed("done payload without result URL".to_string()))
}

/// Keys arrive either as raw `user:password` credentials or pre-encoded
fn basic_auth_value(api_key: &str) -> String {
    if api_key.contains(':') {
        format!("Basic {}", STANDARD.encode(api_key))
    } else {
        format!("Basic {}", api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configuration_is_rejected() {
        assert!(matches!(
            AvatarClient::new(None, Some("key")),
            Err(AvatarError::NotConfigured)
        ));
        assert!(matches!(
            AvatarClient::new(Some("https://api.example.com"), None),
            Err(AvatarError::NotConfigured)
        ));
    }

    #[test]
    fn raw_credentials_are_encoded() {
        assert_eq!(
            basic_auth_value("user@example.com:secret"),
            format!("Basic {}", STANDARD.encode("user@example.com:secret"))
        );
        assert_eq!(basic_auth_value("cHJlZW5jb2RlZA=="), "Basic cHJlZW5jb2RlZA==");
    }

    #[test]
    fn poll_states_parse_from_provider_strings() {
        assert_eq!(PollState::parse("created"), Some(PollState::Created));
        assert_eq!(PollState::parse("started"), Some(PollState::Started));
        assert_eq!(PollState::parse("done"), Some(PollState::Done));
        assert_eq!(PollState::parse("error"), Some(PollState::Error));
        assert_eq!(PollState::parse("warming_up"), None);
    }

    #[test]
    fn personas_map_to_voices_and_presenters() {
        let persona = AvatarPersona::select(SessionKind::Interview, Gender::Female);
        assert_eq!(persona, AvatarPersona::InterviewerFemale);
        assert_eq!(persona.voice_id(), "ko-KR-Neural2-A");
        assert!(persona.presenter_url().contains("Maya"));

        let persona = AvatarPersona::select(SessionKind::Debate, Gender::Male);
        assert_eq!(persona.voice_id(), "ko-KR-Neural2-D");
    }

    #[test]
    fn done_payload_with_zero_duration_fails() {
        let talk: TalkStatus = serde_json::from_str(
            r#"{"status": "done", "result_url": "https://cdn.example.com/talk.mp4", "duration": 0.0}"#,
        )
        .unwrap();
        assert!(matches!(done_result(talk), Err(AvatarError::RenderFailed(_))));
    }

    #[test]
    fn done_payload_with_zero_frames_fails() {
        let talk: TalkStatus = serde_json::from_str(
            r#"{
                "status": "done",
                "result_url": "https://cdn.example.com/talk.mp4",
                "duration": 4.2,
                "metadata": {"num_frames": 0}
            }"#,
        )
        .unwrap();
        assert!(matches!(done_result(talk), Err(AvatarError::RenderFailed(_))));
    }

    #[test]
    fn valid_done_payload_yields_result_url() {
        let talk: TalkStatus = serde_json::from_str(
            r#"{
                "status": "done",
                "result_url": "https://cdn.example.com/talk.mp4",
                "duration": 4.2,
                "metadata": {"num_frames": 105}
            }"#,
        )
        .unwrap();
        assert_eq!(done_result(talk).unwrap(), "https://cdn.example.com/talk.mp4");
    }

    #[test]
    fn error_payload_carries_description() {
        let talk: TalkStatus = serde_json::from_str(
            r#"{"status": "error", "error": {"description": "face not detected"}}"#,
        )
        .unwrap();
        assert_eq!(PollState::parse(&talk.status), Some(PollState::Error));
        assert_eq!(
            talk.error.and_then(|e| e.description).as_deref(),
            Some("face not detected")
        );
    }
}
