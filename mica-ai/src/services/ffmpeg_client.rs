//! External transcoder adapter (ffmpeg)
//!
//! Two jobs: derive the 16 kHz mono PCM track the recognizer and acoustic
//! analyzer consume, and sample video frames for the face extractor.
//! Both run under a hard timeout; a timed-out process is killed, never left
//! lingering.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use crate::config::ANALYZER_TIMEOUT_SECS;

/// Frame sampling stride (every Nth frame)
const FRAME_STRIDE: u32 = 5;

/// Frame sampling cap
const MAX_FRAMES: u32 = 60;

/// Transcoder errors
#[derive(Debug, Error)]
pub enum FfmpegError {
    /// ffmpeg binary not found in PATH
    #[error("ffmpeg binary not found in PATH")]
    BinaryNotFound,

    /// Failed to execute ffmpeg
    #[error("Failed to execute ffmpeg: {0}")]
    ExecutionError(String),

    /// ffmpeg exited with an error
    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    /// Hard timeout exceeded
    #[error("ffmpeg timed out after {0} seconds")]
    Timeout(u64),

    /// I/O error (file read/write)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Input file not found at path
    #[error("Media file not found: {0}")]
    FileNotFound(String),
}

/// ffmpeg client
pub struct FfmpegClient {
    binary_path: String,
}

impl FfmpegClient {
    /// Create new ffmpeg client, verifying the binary is present
    pub fn new() -> Result<Self, FfmpegError> {
        let binary_path = "ffmpeg";

        match std::process::Command::new(binary_path)
            .arg("-version")
            .output()
        {
            Ok(_) => Ok(Self {
                binary_path: binary_path.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FfmpegError::BinaryNotFound),
            Err(e) => Err(FfmpegError::ExecutionError(e.to_string())),
        }
    }

    /// Check if ffmpeg is available
    pub fn is_available() -> bool {
        std::process::Command::new("ffmpeg")
            .arg("-version")
            .output()
            .is_ok()
    }

    /// Derive a mono 16 kHz PCM WAV track next to the input
    pub async fn extract_audio(&self, input: &Path, output: &Path) -> Result<(), FfmpegError> {
        if !input.exists() {
            return Err(FfmpegError::FileNotFound(input.display().to_string()));
        }

        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            "Extracting 16 kHz mono audio track"
        );

        let status = self
            .run(&[
                "-y",
                "-i",
                &input.display().to_string(),
                "-vn",
                "-acodec",
                "pcm_s16le",
                "-ac",
                "1",
                "-ar",
                "16000",
                &output.display().to_string(),
            ])
            .await?;

        if !status.success() {
            let _ = std::fs::remove_file(output);
            return Err(FfmpegError::TranscodeFailed(format!(
                "exit code {:?}",
                status.code()
            )));
        }

        Ok(())
    }

    /// Sample frames (every 5th, capped at 60) into `out_dir` as PNGs.
    ///
    /// Returns the list of written frame paths in filename order.
    pub async fn sample_frames(
        &self,
        input: &Path,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, FfmpegError> {
        if !input.exists() {
            return Err(FfmpegError::FileNotFound(input.display().to_string()));
        }
        std::fs::create_dir_all(out_dir)?;

        let pattern = out_dir.join("frame_%03d.png");
        let select = format!("select=not(mod(n\\,{}))", FRAME_STRIDE);
        let frames = MAX_FRAMES.to_string();

        let status = self
            .run(&[
                "-y",
                "-i",
                &input.display().to_string(),
                "-vf",
                &select,
                "-vsync",
                "vfr",
                "-frames:v",
                &frames,
                &pattern.display().to_string(),
            ])
            .await?;

        if !status.success() {
            return Err(FfmpegError::TranscodeFailed(format!(
                "exit code {:?}",
                status.code()
            )));
        }

        let mut frames: Vec<PathBuf> = std::fs::read_dir(out_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().map(|e| e == "png").unwrap_or(false))
            .collect();
        frames.sort();

        tracing::debug!(
            input = %input.display(),
            frame_count = frames.len(),
            "Sampled video frames"
        );

        Ok(frames)
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::ExitStatus, FfmpegError> {
        let output = tokio::time::timeout(
            Duration::from_secs(ANALYZER_TIMEOUT_SECS),
            Command::new(&self.binary_path)
                .args(args)
                // Timed-out transcodes must not linger
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| FfmpegError::Timeout(ANALYZER_TIMEOUT_SECS))?
        .map_err(|e| FfmpegError::ExecutionError(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(stderr = %stderr, "ffmpeg reported failure");
        }

        Ok(output.status)
    }
}
