//! Avatar render pipeline
//!
//! Content-addressed rendering: the cache key is the SHA-256 of
//! `script|video_type|gender|phase` over the full script, so an identical
//! request always resolves to identical bytes. Fallback order on render
//! failure: prerendered sample for `(video_type, phase)`, then a minimal
//! placeholder MP4 written under the key path. The provider sees at most 500
//! characters of script.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mica_common::hash::cache_key;

use crate::models::{Gender, SessionKind};
use crate::services::avatar_client::{AvatarClient, AvatarPersona};
use crate::services::response_cache::ResponseCache;

/// Provider-side script limit (characters)
const SCRIPT_MAX_CHARS: usize = 500;

/// A clip smaller than this is treated as a failed render
const MIN_CLIP_BYTES: u64 = 1024;

/// Avatar render pipeline
pub struct AvatarPipeline {
    cache_dir: PathBuf,
    samples_dir: PathBuf,
    client: Option<Arc<AvatarClient>>,
    cache: Arc<ResponseCache>,
}

impl AvatarPipeline {
    pub fn new(
        cache_dir: PathBuf,
        samples_dir: PathBuf,
        client: Option<Arc<AvatarClient>>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            cache_dir,
            samples_dir,
            client,
            cache,
        }
    }

    /// Render a clip for the script, reusing the content-addressed cache
    pub async fn render_and_cache(
        &self,
        script: &str,
        kind: SessionKind,
        gender: Gender,
        phase: &str,
    ) -> std::io::Result<PathBuf> {
        let key = cache_key(&[script, kind.as_str(), gender.as_str(), phase]);
        let clip_path = self.cache_dir.join(format!("{}.mp4", key));

        if let Some(path) = self.cache.get_file(&key).await {
            if clip_is_valid(&path) {
                tracing::debug!(key = %key, "Avatar cache hit");
                return Ok(path);
            }
        }
        // The disk outlives the in-memory map across restarts
        if clip_is_valid(&clip_path) {
            self.cache.put_file(&key, clip_path.clone()).await;
            return Ok(clip_path);
        }

        if let Some(client) = &self.client {
            let provider_script = truncate_script(script, SCRIPT_MAX_CHARS);
            let persona = AvatarPersona::select(kind, gender);

            match client.render(&provider_script, persona).await {
                Ok(bytes) if bytes.len() as u64 > MIN_CLIP_BYTES => {
                    write_atomic(&clip_path, &bytes)?;
                    self.cache.put_file(&key, clip_path.clone()).await;
                    tracing::info!(key = %key, size = bytes.len(), "Avatar clip cached");
                    return Ok(clip_path);
                }
                Ok(bytes) => {
                    tracing::warn!(
                        key = %key,
                        size = bytes.len(),
                        "Avatar result below size floor, falling back"
                    );
                }
                Err(e) => {
                    tracing::warn!(key = %key, "Avatar render failed, falling back: {}", e);
                }
            }
        }

        let sample = self
            .samples_dir
            .join(format!("{}_{}.mp4", kind.as_str(), phase));
        if clip_is_valid(&sample) {
            tracing::info!(key = %key, sample = %sample.display(), "Serving prerendered sample");
            self.cache.put_file(&key, sample.clone()).await;
            return Ok(sample);
        }

        write_atomic(&clip_path, &placeholder_mp4())?;
        self.cache.put_file(&key, clip_path.clone()).await;
        tracing::info!(key = %key, "Serving placeholder clip");
        Ok(clip_path)
    }
}

fn clip_is_valid(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > MIN_CLIP_BYTES)
        .unwrap_or(false)
}

/// Truncate on a char boundary, marking the cut
fn truncate_script(script: &str, max_chars: usize) -> String {
    if script.chars().count() <= max_chars {
        return script.to_string();
    }
    let mut truncated: String = script.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Minimal valid MP4 (ftyp + zero-padded mdat), sized past the clip floor
pub(crate) fn placeholder_mp4() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2048);
    bytes.extend_from_slice(&24u32.to_be_bytes());
    bytes.extend_from_slice(b"ftyp");
    bytes.extend_from_slice(b"isom");
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(b"isomavc1");

    let mdat_size = (2048 - bytes.len()) as u32;
    bytes.extend_from_slice(&mdat_size.to_be_bytes());
    bytes.extend_from_slice(b"mdat");
    bytes.resize(2048, 0);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_without_provider(root: &Path) -> AvatarPipeline {
        AvatarPipeline::new(
            root.join("cache"),
            root.join("samples"),
            None,
            Arc::new(ResponseCache::new()),
        )
    }

    #[test]
    fn short_scripts_pass_through() {
        assert_eq!(truncate_script("안녕하세요", 500), "안녕하세요");
    }

    #[test]
    fn long_scripts_truncate_on_char_boundary() {
        let script = "가".repeat(700);
        let truncated = truncate_script(&script, 500);
        assert_eq!(truncated.chars().count(), 501);
        assert!(truncated.ends_with('…'));
        assert!(truncated.starts_with('가'));
    }

    #[test]
    fn placeholder_is_a_sized_mp4() {
        let bytes = placeholder_mp4();
        assert_eq!(bytes.len(), 2048);
        assert_eq!(&bytes[4..8], b"ftyp");
        assert!(bytes.len() as u64 > MIN_CLIP_BYTES);
    }

    #[tokio::test]
    async fn identical_requests_return_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_without_provider(dir.path());

        let first = pipeline
            .render_and_cache("자기소개를 부탁드립니다.", SessionKind::Interview, Gender::Male, "INTRO")
            .await
            .unwrap();
        let second = pipeline
            .render_and_cache("자기소개를 부탁드립니다.", SessionKind::Interview, Gender::Male, "INTRO")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn key_varies_with_gender_and_phase() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_without_provider(dir.path());

        let male = pipeline
            .render_and_cache("script", SessionKind::Interview, Gender::Male, "INTRO")
            .await
            .unwrap();
        let female = pipeline
            .render_and_cache("script", SessionKind::Interview, Gender::Female, "INTRO")
            .await
            .unwrap();
        let fit = pipeline
            .render_and_cache("script", SessionKind::Interview, Gender::Male, "FIT")
            .await
            .unwrap();

        assert_ne!(male, female);
        assert_ne!(male, fit);
    }

    #[tokio::test]
    async fn prerendered_sample_wins_over_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let samples = dir.path().join("samples");
        std::fs::create_dir_all(&samples).unwrap();
        let sample_path = samples.join("debate_opening.mp4");
        std::fs::write(&sample_path, vec![7u8; 4096]).unwrap();

        let pipeline = pipeline_without_provider(dir.path());
        let clip = pipeline
            .render_and_cache("주장", SessionKind::Debate, Gender::Female, "opening")
            .await
            .unwrap();

        assert_eq!(clip, sample_path);
    }

    #[tokio::test]
    async fn undersized_samples_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let samples = dir.path().join("samples");
        std::fs::create_dir_all(&samples).unwrap();
        std::fs::write(samples.join("debate_opening.mp4"), b"tiny").unwrap();

        let pipeline = pipeline_without_provider(dir.path());
        let clip = pipeline
            .render_and_cache("주장", SessionKind::Debate, Gender::Female, "opening")
            .await
            .unwrap();

        // Fell through to the placeholder under the cache key
        assert!(clip.starts_with(dir.path().join("cache")));
        assert_eq!(std::fs::read(&clip).unwrap().len(), 2048);
    }

    #[tokio::test]
    async fn deleted_clips_are_rendered_again() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_without_provider(dir.path());

        let clip = pipeline
            .render_and_cache("script", SessionKind::Interview, Gender::Male, "INTRO")
            .await
            .unwrap();
        std::fs::remove_file(&clip).unwrap();

        let again = pipeline
            .render_and_cache("script", SessionKind::Interview, Gender::Male, "INTRO")
            .await
            .unwrap();
        assert!(again.exists());
    }
}
