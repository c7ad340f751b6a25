//! LLM adapter (OpenAI-shape chat completion API)
//!
//! One client serves both personas; the persona selects the system prompt.
//! Callers build the user prompt and fall back to phase templates when the
//! client is unavailable or errors.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Request timeout
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Completion model
const MODEL: &str = "gpt-4o-mini";

/// Sampling temperature
const TEMPERATURE: f64 = 0.7;

/// LLM client errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// Provider endpoint or key not configured
    #[error("LLM provider not configured")]
    NotConfigured,

    /// HTTP request failed
    #[error("LLM request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider returned a non-success status
    #[error("LLM API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Response carried no usable choice
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

/// System-prompt persona
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    Interviewer,
    Debater,
}

impl Persona {
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Persona::Interviewer => {
                "당신은 기업의 전문 면접관입니다. 지원자의 프로필을 바탕으로 \
                 간결하고 구체적인 면접 질문을 한국어로 작성하세요. \
                 질문 외의 설명은 덧붙이지 마세요."
            }
            Persona::Debater => {
                "당신은 토론 대회의 상대 토론자입니다. 주어진 주제와 입장에 따라 \
                 논리적이고 설득력 있는 발언을 한국어로 작성하세요. \
                 발언 외의 설명은 덧붙이지 마세요."
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// LLM chat-completion client
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LlmClient {
    /// Create a client; fails when the provider is not configured
    pub fn new(base_url: Option<&str>, api_key: Option<&str>) -> Result<Self, LlmError> {
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .ok_or(LlmError::NotConfigured)?;
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// One chat completion under the persona's system prompt
    pub async fn complete(
        &self,
        persona: Persona,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: persona.system_prompt().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens,
            temperature: TEMPERATURE,
        };

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(persona = ?persona, max_tokens, "Requesting LLM completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        first_content(parsed)
    }
}

/// Extract the first non-empty choice
fn first_content(response: ChatResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .filter_map(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .find(|c| !c.is_empty())
        .ok_or(LlmError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configuration_is_rejected() {
        assert!(matches!(
            LlmClient::new(None, Some("key")),
            Err(LlmError::NotConfigured)
        ));
        assert!(matches!(
            LlmClient::new(Some("https://api.example.com/v1"), Some("  ")),
            Err(LlmError::NotConfigured)
        ));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let client =
            LlmClient::new(Some("https://api.example.com/v1/"), Some("key")).unwrap();
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }

    #[test]
    fn parses_chat_completion_response() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": "  자기소개를 부탁드립니다.  "
                    },
                    "finish_reason": "stop"
                }
            ]
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(first_content(response).unwrap(), "자기소개를 부탁드립니다.");
    }

    #[test]
    fn empty_choices_are_an_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_content(response), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn null_content_is_an_error() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(first_content(response), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn personas_carry_distinct_prompts() {
        assert_ne!(
            Persona::Interviewer.system_prompt(),
            Persona::Debater.system_prompt()
        );
    }
}
