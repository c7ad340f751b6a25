//! Speech recognition adapter (whisper CLI)
//!
//! Wraps the `whisper` command-line recognizer. Output is requested as JSON
//! and mapped to a `Transcript`; segment-level average log-probabilities are
//! mapped monotonically to a [0,1] confidence.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use crate::config::ANALYZER_TIMEOUT_SECS;
use crate::models::{Transcript, TranscriptSegment, WordTimestamp};

/// Recognizer model size
const WHISPER_MODEL: &str = "base";

/// Confidence when segments carry no log-probabilities
const DEFAULT_CONFIDENCE: f64 = 0.75;

/// Whisper client errors
#[derive(Debug, Error)]
pub enum WhisperError {
    /// whisper binary not found in PATH
    #[error("whisper binary not found in PATH")]
    BinaryNotFound,

    /// Failed to execute whisper
    #[error("Failed to execute whisper: {0}")]
    ExecutionError(String),

    /// Recognition exited with an error
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Failed to parse whisper JSON output
    #[error("Failed to parse whisper output: {0}")]
    ParseError(String),

    /// Hard timeout exceeded
    #[error("whisper timed out after {0} seconds")]
    Timeout(u64),

    /// I/O error (file read/write)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Audio file not found at path
    #[error("Audio file not found: {0}")]
    FileNotFound(String),
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    text: String,
    language: Option<String>,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    text: String,
    start: f64,
    end: f64,
    avg_logprob: Option<f64>,
    #[serde(default)]
    words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    word: String,
    start: f64,
    end: f64,
}

/// Whisper client
pub struct WhisperClient {
    binary_path: String,
}

impl WhisperClient {
    /// Create new whisper client, verifying the binary is present
    pub fn new() -> Result<Self, WhisperError> {
        let binary_path = "whisper";

        match std::process::Command::new(binary_path)
            .arg("--help")
            .output()
        {
            Ok(_) => Ok(Self {
                binary_path: binary_path.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(WhisperError::BinaryNotFound),
            Err(e) => Err(WhisperError::ExecutionError(e.to_string())),
        }
    }

    /// Check if whisper is available
    pub fn is_available() -> bool {
        std::process::Command::new("whisper")
            .arg("--help")
            .output()
            .is_ok()
    }

    /// Transcribe a 16 kHz mono WAV track
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        language: &str,
    ) -> Result<Transcript, WhisperError> {
        if !audio_path.exists() {
            return Err(WhisperError::FileNotFound(
                audio_path.display().to_string(),
            ));
        }

        let out_dir = std::env::temp_dir().join(format!("whisper_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&out_dir)?;

        tracing::debug!(
            audio_file = %audio_path.display(),
            language = language,
            "Running whisper transcription"
        );

        let output = tokio::time::timeout(
            Duration::from_secs(ANALYZER_TIMEOUT_SECS),
            Command::new(&self.binary_path)
                .arg(audio_path)
                .args(["--model", WHISPER_MODEL])
                .args(["--language", language])
                .args(["--output_format", "json"])
                .args(["--output_dir", &out_dir.display().to_string()])
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            let _ = std::fs::remove_dir_all(&out_dir);
            WhisperError::Timeout(ANALYZER_TIMEOUT_SECS)
        })?
        .map_err(|e| WhisperError::ExecutionError(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let _ = std::fs::remove_dir_all(&out_dir);
            return Err(WhisperError::TranscriptionFailed(format!(
                "Exit code: {:?}, stderr: {}",
                output.status.code(),
                stderr
            )));
        }

        // whisper writes <input stem>.json into the output directory
        let stem = audio_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let json_path = out_dir.join(format!("{}.json", stem));

        let json_content = tokio::fs::read_to_string(&json_path).await;
        let _ = std::fs::remove_dir_all(&out_dir);
        let json_content = json_content?;

        let transcript = parse_whisper_json(&json_content)?;

        tracing::info!(
            audio_file = %audio_path.display(),
            word_count = transcript.word_count(),
            confidence = transcript.confidence,
            "Transcription completed"
        );

        Ok(transcript)
    }
}

/// Parse whisper JSON output into a Transcript
pub fn parse_whisper_json(json: &str) -> Result<Transcript, WhisperError> {
    let output: WhisperOutput =
        serde_json::from_str(json).map_err(|e| WhisperError::ParseError(e.to_string()))?;

    let segments: Vec<TranscriptSegment> = output
        .segments
        .iter()
        .map(|s| TranscriptSegment {
            text: s.text.trim().to_string(),
            start: s.start,
            end: s.end,
            avg_logprob: s.avg_logprob.unwrap_or(0.0),
        })
        .collect();

    let words: Vec<WordTimestamp> = output
        .segments
        .iter()
        .flat_map(|s| s.words.iter())
        .map(|w| WordTimestamp {
            word: w.word.trim().to_string(),
            start: w.start,
            end: w.end,
        })
        .collect();

    // Map mean segment log-probability monotonically into [0,1]
    let logprobs: Vec<f64> = output
        .segments
        .iter()
        .filter_map(|s| s.avg_logprob)
        .collect();
    let confidence = if logprobs.is_empty() {
        DEFAULT_CONFIDENCE
    } else {
        let mean = logprobs.iter().sum::<f64>() / logprobs.len() as f64;
        (mean + 1.0).clamp(0.0, 1.0)
    };

    Ok(Transcript {
        text: output.text.trim().to_string(),
        language: output.language.unwrap_or_else(|| "ko".to_string()),
        segments,
        words,
        confidence,
        degraded: false,
    })
}
