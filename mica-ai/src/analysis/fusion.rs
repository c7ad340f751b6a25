//! Analyzer fusion
//!
//! Runs the facial and acoustic analyzers in parallel, STT serially (its
//! transcript feeds the LLM prompts later), and folds the three summaries
//! into one `MultimodalObservation`. Adapter failures never propagate: a
//! failed analyzer contributes its deterministic default, flagged degraded.

use std::path::Path;
use std::sync::Arc;

use crate::models::{AcousticSummary, FacialSummary, MultimodalObservation, Transcript};
use crate::services::{AdapterSet, ScratchMedia};

use super::scoring::contains_connective;

/// Word count above which the transcript is considered substantive
const SUBSTANTIVE_WORDS: usize = 50;

/// Up to this many key-argument sentences are kept
const MAX_KEY_ARGUMENTS: usize = 3;

/// Fusion of the capability adapters for one answer clip
pub struct FusionEngine {
    adapters: Arc<AdapterSet>,
}

impl FusionEngine {
    pub fn new(adapters: Arc<AdapterSet>) -> Self {
        Self { adapters }
    }

    /// Analyze one ingested clip into a multimodal observation
    pub async fn fuse(
        &self,
        media: &ScratchMedia,
        session_id: i64,
        phase: &str,
    ) -> MultimodalObservation {
        // Facial and acoustic run in parallel while STT holds this task
        let facial_task = {
            let ffmpeg = self.adapters.ffmpeg.as_available().cloned();
            let openface = self.adapters.openface.as_available().cloned();
            let video = media.video_path().to_path_buf();
            let frames_dir = media.frames_dir();
            tokio::spawn(async move {
                let (Some(ffmpeg), Some(openface)) = (ffmpeg, openface) else {
                    return FacialSummary::degraded_default();
                };
                let frames = match ffmpeg.sample_frames(&video, &frames_dir).await {
                    Ok(frames) => frames,
                    Err(e) => {
                        tracing::warn!("Frame sampling failed, facial analysis degrades: {}", e);
                        return FacialSummary::degraded_default();
                    }
                };
                if frames.is_empty() {
                    tracing::warn!("No frames sampled, facial analysis degrades");
                    return FacialSummary::degraded_default();
                }
                match openface.analyze_frames(&frames_dir).await {
                    Ok(summary) => summary,
                    Err(e) => {
                        tracing::warn!("Facial analysis failed, degrading: {}", e);
                        FacialSummary::degraded_default()
                    }
                }
            })
        };

        let acoustic_task = {
            let analyzer = self.adapters.acoustic.as_available().cloned();
            let audio = media.audio_path().map(Path::to_path_buf);
            tokio::task::spawn_blocking(move || {
                let (Some(analyzer), Some(audio)) = (analyzer, audio) else {
                    return AcousticSummary::degraded_default();
                };
                match analyzer.analyze_wav(&audio) {
                    Ok(summary) => summary,
                    Err(e) => {
                        tracing::warn!("Acoustic analysis failed, degrading: {}", e);
                        AcousticSummary::degraded_default()
                    }
                }
            })
        };

        let transcript = match (
            self.adapters.whisper.as_available(),
            media.audio_path(),
        ) {
            (Some(whisper), Some(audio)) => match whisper.transcribe(audio, "ko").await {
                Ok(transcript) => transcript,
                Err(e) => {
                    tracing::warn!(session_id, phase, "Transcription failed, degrading: {}", e);
                    Transcript::degraded_default()
                }
            },
            _ => Transcript::degraded_default(),
        };

        let (facial, acoustic) = tokio::join!(facial_task, acoustic_task);
        let facial = facial.unwrap_or_else(|e| {
            tracing::warn!(session_id, phase, "Facial task panicked: {}", e);
            FacialSummary::degraded_default()
        });
        let acoustic = acoustic.unwrap_or_else(|e| {
            tracing::warn!(session_id, phase, "Acoustic task panicked: {}", e);
            AcousticSummary::degraded_default()
        });

        let observation = compose(transcript, facial, acoustic);
        tracing::info!(
            session_id,
            phase,
            words = observation.transcript.word_count(),
            coherence = observation.coherence,
            degraded_stt = observation.transcript.degraded,
            degraded_facial = observation.facial.degraded,
            degraded_acoustic = observation.acoustic.degraded,
            "Fusion completed"
        );
        observation
    }
}

/// Fold the three summaries into one observation
pub fn compose(
    transcript: Transcript,
    facial: FacialSummary,
    acoustic: AcousticSummary,
) -> MultimodalObservation {
    let text_conf = if transcript.word_count() > SUBSTANTIVE_WORDS {
        0.7
    } else {
        0.4
    };
    let facial_conf = facial.confidence_mean.clamp(0.0, 1.0);
    let audio_conf = acoustic.voice_stability.clamp(0.0, 1.0);
    let coherence = (text_conf + facial_conf + audio_conf) / 3.0;

    let key_arguments = extract_key_arguments(&transcript.text);

    MultimodalObservation {
        transcript,
        facial,
        acoustic,
        coherence,
        key_arguments,
    }
}

/// Sentences carrying a reasoning connective, in order, capped
pub fn extract_key_arguments(text: &str) -> Vec<String> {
    text.split(['.', '!', '?', '。'])
        .map(str::trim)
        .filter(|s| !s.is_empty() && contains_connective(s))
        .take(MAX_KEY_ARGUMENTS)
        .map(|s| s.to_string())
        .collect()
}
