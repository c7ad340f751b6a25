//! Media ingest
//!
//! Persists an uploaded answer clip into a per-request scratch directory and
//! derives the 16 kHz mono WAV the STT and acoustic analyzers consume. The
//! returned guard keeps every derived path valid for the analysis window and
//! removes the whole directory on drop, regardless of downstream success.
//!
//! A failed audio derivation is not an ingest error: the clip still feeds the
//! facial analyzer while STT and acoustic degrade to their defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::services::ffmpeg_client::FfmpegClient;

/// Ingest errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// Uploaded blob was empty
    #[error("Uploaded media is empty")]
    EmptyUpload,

    /// Could not persist the upload
    #[error("Failed to persist upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Scratch files for one analysis window; the directory dies with the guard
pub struct ScratchMedia {
    dir: PathBuf,
    video_path: PathBuf,
    audio_path: Option<PathBuf>,
}

impl ScratchMedia {
    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    /// 16 kHz mono WAV; None when derivation failed or no transcoder exists
    pub fn audio_path(&self) -> Option<&Path> {
        self.audio_path.as_deref()
    }

    /// Where the frame sampler writes; removed with the guard
    pub fn frames_dir(&self) -> PathBuf {
        self.dir.join("frames")
    }
}

impl Drop for ScratchMedia {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), "Scratch cleanup failed: {}", e);
        }
    }
}

/// Upload persistence and audio derivation
pub struct MediaIngest {
    scratch_root: PathBuf,
    ffmpeg: Option<Arc<FfmpegClient>>,
}

impl MediaIngest {
    pub fn new(scratch_root: PathBuf, ffmpeg: Option<Arc<FfmpegClient>>) -> Self {
        Self {
            scratch_root,
            ffmpeg,
        }
    }

    /// Persist an uploaded clip and derive its audio track
    pub async fn ingest(
        &self,
        bytes: &[u8],
        session_id: i64,
        phase: &str,
    ) -> Result<ScratchMedia, IngestError> {
        if bytes.is_empty() {
            return Err(IngestError::EmptyUpload);
        }

        let dir = self.scratch_root.join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir_all(&dir)?;

        let extension = sniff_extension(bytes);
        let video_path = dir.join(format!("upload.{}", extension));

        // Guard first: any later failure still cleans the directory
        let mut media = ScratchMedia {
            dir,
            video_path,
            audio_path: None,
        };
        tokio::fs::write(&media.video_path, bytes).await?;

        tracing::debug!(
            session_id,
            phase,
            size = bytes.len(),
            container = extension,
            "Upload persisted to scratch"
        );

        if is_wav(bytes) {
            media.audio_path = Some(media.video_path.clone());
        } else if let Some(ffmpeg) = &self.ffmpeg {
            let wav_path = media.dir.join("audio.wav");
            match ffmpeg.extract_audio(&media.video_path, &wav_path).await {
                Ok(()) => media.audio_path = Some(wav_path),
                Err(e) => {
                    tracing::warn!(
                        session_id,
                        phase,
                        "Audio extraction failed, STT and acoustic analysis degrade: {}",
                        e
                    );
                }
            }
        }

        Ok(media)
    }
}

/// Container extension by magic bytes; unknown blobs keep a neutral name
fn sniff_extension(bytes: &[u8]) -> &'static str {
    match infer::get(bytes) {
        Some(kind) => kind.extension(),
        None => "bin",
    }
}

fn is_wav(bytes: &[u8]) -> bool {
    infer::get(bytes)
        .map(|kind| kind.extension() == "wav")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_mp4() -> Vec<u8> {
        let mut bytes = vec![0, 0, 0, 16];
        bytes.extend_from_slice(b"ftypisom");
        bytes.extend_from_slice(&[0, 0, 0, 1]);
        bytes
    }

    fn minimal_wav() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let ingest = MediaIngest::new(dir.path().to_path_buf(), None);
        assert!(matches!(
            ingest.ingest(&[], 1, "INTRO").await,
            Err(IngestError::EmptyUpload)
        ));
    }

    #[tokio::test]
    async fn mp4_upload_lands_with_sniffed_extension() {
        let dir = tempfile::tempdir().unwrap();
        let ingest = MediaIngest::new(dir.path().to_path_buf(), None);

        let media = ingest.ingest(&minimal_mp4(), 1, "INTRO").await.unwrap();
        assert!(media.video_path().exists());
        assert_eq!(
            media.video_path().extension().and_then(|e| e.to_str()),
            Some("mp4")
        );
        // No transcoder: audio degrades
        assert!(media.audio_path().is_none());
    }

    #[tokio::test]
    async fn wav_upload_doubles_as_its_own_audio_track() {
        let dir = tempfile::tempdir().unwrap();
        let ingest = MediaIngest::new(dir.path().to_path_buf(), None);

        let media = ingest.ingest(&minimal_wav(), 2, "opening").await.unwrap();
        assert_eq!(media.audio_path(), Some(media.video_path()));
    }

    #[tokio::test]
    async fn scratch_directory_dies_with_the_guard() {
        let dir = tempfile::tempdir().unwrap();
        let ingest = MediaIngest::new(dir.path().to_path_buf(), None);

        let media = ingest.ingest(&minimal_mp4(), 3, "TECH").await.unwrap();
        let scratch_dir = media.video_path().parent().unwrap().to_path_buf();
        assert!(scratch_dir.exists());

        drop(media);
        assert!(!scratch_dir.exists());
    }

    #[test]
    fn unknown_bytes_get_a_neutral_extension() {
        assert_eq!(sniff_extension(&[1, 2, 3, 4]), "bin");
        assert_eq!(sniff_extension(&minimal_mp4()), "mp4");
    }
}
