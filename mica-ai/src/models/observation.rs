//! Multimodal observation: the fused output of the three analyzers
//!
//! Each modality summary carries a `degraded` flag. Degraded means the
//! analyzer returned its deterministic default instead of a computed result;
//! the scoring engine floors the dependent axes of a degraded analyzer at 2.0.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dominant facial emotion derived from Action Unit intensities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Surprise,
    Neutral,
}

/// One recognized speech segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Segment start (seconds)
    pub start: f64,
    /// Segment end (seconds)
    pub end: f64,
    /// Average token log-probability for the segment
    pub avg_logprob: f64,
}

/// Word-level timestamp, when the recognizer provides them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordTimestamp {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Speech-to-text result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: String,
    pub segments: Vec<TranscriptSegment>,
    pub words: Vec<WordTimestamp>,
    /// Recognition confidence in [0,1], mapped from segment log-probabilities
    pub confidence: f64,
    pub degraded: bool,
}

impl Transcript {
    /// Deterministic default for a degraded or absent recognizer
    pub fn degraded_default() -> Self {
        Self {
            text: String::new(),
            language: "ko".to_string(),
            segments: Vec::new(),
            words: Vec::new(),
            confidence: 0.75,
            degraded: true,
        }
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Sentences, by terminal punctuation ('.', '!', '?', '。')
    pub fn sentence_count(&self) -> usize {
        self.text
            .split(['.', '!', '?', '。'])
            .filter(|s| !s.trim().is_empty())
            .count()
    }

    /// Words per minute over the recognized span (0.0 when unknown)
    pub fn speaking_rate_wpm(&self) -> f64 {
        let duration = self.segments.last().map(|s| s.end).unwrap_or(0.0);
        if duration <= 0.0 {
            return 0.0;
        }
        self.word_count() as f64 / (duration / 60.0)
    }

    /// Pauses longer than 1.5 s between consecutive segments
    pub fn long_pause_count(&self) -> usize {
        self.segments
            .windows(2)
            .filter(|pair| pair[1].start - pair[0].end > 1.5)
            .count()
    }
}

/// Facial analysis summary: means and variances over valid frames
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacialSummary {
    pub confidence_mean: f64,
    pub confidence_var: f64,
    pub gaze_x_mean: f64,
    pub gaze_x_var: f64,
    pub gaze_y_mean: f64,
    pub gaze_y_var: f64,
    pub pitch_mean: f64,
    pub yaw_mean: f64,
    pub roll_mean: f64,
    pub pose_var: f64,
    /// Mean Action Unit intensities keyed by AU name (e.g. "AU01_r")
    pub au_means: BTreeMap<String, f64>,
    /// Frames that survived the confidence filter
    pub valid_frames: usize,
    /// 1.0 = perfectly steady gaze, 0.0 = erratic
    pub gaze_stability: f64,
    /// 1.0 = perfectly steady head pose, 0.0 = erratic
    pub head_stability: f64,
    pub dominant_emotion: Emotion,
    pub degraded: bool,
}

impl FacialSummary {
    /// Deterministic default for a degraded extractor or zero surviving frames
    pub fn degraded_default() -> Self {
        let mut au_means = BTreeMap::new();
        au_means.insert("AU01_r".to_string(), 1.2);
        au_means.insert("AU02_r".to_string(), 0.8);

        Self {
            confidence_mean: 0.9,
            confidence_var: 0.0,
            gaze_x_mean: 0.1,
            gaze_x_var: 0.0,
            gaze_y_mean: 0.1,
            gaze_y_var: 0.0,
            pitch_mean: 0.0,
            yaw_mean: 0.0,
            roll_mean: 0.0,
            pose_var: 0.0,
            au_means,
            valid_frames: 0,
            gaze_stability: 1.0,
            head_stability: 1.0,
            dominant_emotion: Emotion::Neutral,
            degraded: true,
        }
    }
}

/// Acoustic analysis summary over the 16 kHz mono track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcousticSummary {
    pub pitch_mean: f64,
    pub pitch_std: f64,
    pub rms_mean: f64,
    pub rms_std: f64,
    /// Estimated tempo (BPM); 0.0 when undetectable
    pub tempo: f64,
    pub zero_crossing_rate: f64,
    /// 13 MFCC means
    pub mfcc_means: Vec<f64>,
    /// 1 - centroid deviation ratio, in [0,1]
    pub voice_stability: f64,
    /// 1 - RMS deviation ratio, in [0,1]
    pub volume_consistency: f64,
    /// 1 - 2 * silence ratio, in [0,1]
    pub fluency: f64,
    pub degraded: bool,
}

impl AcousticSummary {
    /// Deterministic default for a degraded analyzer
    pub fn degraded_default() -> Self {
        Self {
            pitch_mean: 0.0,
            pitch_std: 0.0,
            rms_mean: 0.0,
            rms_std: 0.0,
            tempo: 0.0,
            zero_crossing_rate: 0.0,
            mfcc_means: vec![0.0; 13],
            voice_stability: 0.5,
            volume_consistency: 0.5,
            fluency: 0.5,
            degraded: true,
        }
    }
}

/// Fusion of the analyzer outputs for one answer clip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultimodalObservation {
    pub transcript: Transcript,
    pub facial: FacialSummary,
    pub acoustic: AcousticSummary,
    /// Mean of the three modality confidence proxies, in [0,1]
    pub coherence: f64,
    /// Up to 3 sentences containing a reasoning connective
    pub key_arguments: Vec<String>,
}

impl MultimodalObservation {
    /// All three analyzers degraded (the total-failure case)
    pub fn is_total_failure(&self) -> bool {
        self.transcript.degraded && self.facial.degraded && self.acoustic.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_with(text: &str, segments: Vec<TranscriptSegment>) -> Transcript {
        Transcript {
            text: text.to_string(),
            language: "ko".to_string(),
            segments,
            words: Vec::new(),
            confidence: 0.9,
            degraded: false,
        }
    }

    #[test]
    fn word_and_sentence_counts() {
        let t = transcript_with("저는 팀 프로젝트를 좋아합니다. 협업이 중요합니다!", vec![]);
        assert_eq!(t.word_count(), 6);
        assert_eq!(t.sentence_count(), 2);
    }

    #[test]
    fn empty_transcript_counts_are_zero() {
        let t = Transcript::degraded_default();
        assert_eq!(t.word_count(), 0);
        assert_eq!(t.sentence_count(), 0);
        assert_eq!(t.speaking_rate_wpm(), 0.0);
    }

    #[test]
    fn speaking_rate_uses_last_segment_end() {
        let t = transcript_with(
            "하나 둘 셋 넷 다섯 여섯",
            vec![
                TranscriptSegment {
                    text: "하나 둘 셋".to_string(),
                    start: 0.0,
                    end: 1.5,
                    avg_logprob: -0.2,
                },
                TranscriptSegment {
                    text: "넷 다섯 여섯".to_string(),
                    start: 1.5,
                    end: 3.0,
                    avg_logprob: -0.2,
                },
            ],
        );
        // 6 words over 3 seconds = 120 wpm
        assert!((t.speaking_rate_wpm() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn long_pauses_detected_between_segments() {
        let t = transcript_with(
            "앞 뒤",
            vec![
                TranscriptSegment {
                    text: "앞".to_string(),
                    start: 0.0,
                    end: 1.0,
                    avg_logprob: -0.3,
                },
                TranscriptSegment {
                    text: "뒤".to_string(),
                    start: 3.0,
                    end: 4.0,
                    avg_logprob: -0.3,
                },
            ],
        );
        assert_eq!(t.long_pause_count(), 1);
    }

    #[test]
    fn facial_defaults_are_steady() {
        let f = FacialSummary::degraded_default();
        assert!(f.degraded);
        assert_eq!(f.gaze_stability, 1.0);
        assert_eq!(f.head_stability, 1.0);
        assert_eq!(f.au_means.get("AU01_r"), Some(&1.2));
        assert_eq!(f.dominant_emotion, Emotion::Neutral);
    }

    #[test]
    fn total_failure_requires_all_analyzers_degraded() {
        let obs = MultimodalObservation {
            transcript: Transcript::degraded_default(),
            facial: FacialSummary::degraded_default(),
            acoustic: AcousticSummary::degraded_default(),
            coherence: 0.5,
            key_arguments: Vec::new(),
        };
        assert!(obs.is_total_failure());

        let mut partial = obs.clone();
        partial.facial.degraded = false;
        assert!(!partial.is_total_failure());
    }
}
