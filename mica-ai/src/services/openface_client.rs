//! Facial analysis adapter (OpenFace)
//!
//! Runs `FaceLandmarkImg` over a directory of sampled frames and averages the
//! per-frame gaze, head pose, and Action Unit intensities. Frames with
//! detection confidence below 0.5 are dropped; if no frame survives, the
//! deterministic defaults are returned by the caller.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use crate::config::ANALYZER_TIMEOUT_SECS;
use crate::models::{Emotion, FacialSummary};

/// Minimum per-frame detection confidence
const MIN_FRAME_CONFIDENCE: f64 = 0.5;

/// Full scale of an Action Unit intensity
const AU_INTENSITY_SCALE: f64 = 3.0;

/// OpenFace client errors
#[derive(Debug, Error)]
pub enum OpenFaceError {
    /// FaceLandmarkImg binary not found in PATH
    #[error("FaceLandmarkImg binary not found in PATH")]
    BinaryNotFound,

    /// Failed to execute FaceLandmarkImg
    #[error("Failed to execute FaceLandmarkImg: {0}")]
    ExecutionError(String),

    /// Extraction exited with an error
    #[error("Facial analysis failed: {0}")]
    AnalysisFailed(String),

    /// Failed to parse OpenFace CSV output
    #[error("Failed to parse OpenFace output: {0}")]
    ParseError(String),

    /// Hard timeout exceeded
    #[error("FaceLandmarkImg timed out after {0} seconds")]
    Timeout(u64),

    /// I/O error (file read/write)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No frames survived the confidence filter
    #[error("No valid frames in extractor output")]
    NoValidFrames,
}

/// One parsed frame of OpenFace output
#[derive(Debug, Clone)]
pub struct FrameObservation {
    pub confidence: f64,
    pub gaze_x: f64,
    pub gaze_y: f64,
    /// Head pose in radians (Rx, Ry, Rz)
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub aus: BTreeMap<String, f64>,
}

/// OpenFace client
pub struct OpenFaceClient {
    binary_path: String,
}

impl OpenFaceClient {
    /// Create new OpenFace client, verifying the binary is present
    pub fn new() -> Result<Self, OpenFaceError> {
        let binary_path = "FaceLandmarkImg";

        match std::process::Command::new(binary_path)
            .arg("-help")
            .output()
        {
            Ok(_) => Ok(Self {
                binary_path: binary_path.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OpenFaceError::BinaryNotFound)
            }
            Err(e) => Err(OpenFaceError::ExecutionError(e.to_string())),
        }
    }

    /// Check if OpenFace is available
    pub fn is_available() -> bool {
        std::process::Command::new("FaceLandmarkImg")
            .arg("-help")
            .output()
            .is_ok()
    }

    /// Run the extractor over a directory of sampled frames and summarize
    pub async fn analyze_frames(&self, frames_dir: &Path) -> Result<FacialSummary, OpenFaceError> {
        let out_dir = frames_dir.join("processed");
        std::fs::create_dir_all(&out_dir)?;

        tracing::debug!(
            frames_dir = %frames_dir.display(),
            "Running OpenFace feature extraction"
        );

        let output = tokio::time::timeout(
            Duration::from_secs(ANALYZER_TIMEOUT_SECS),
            Command::new(&self.binary_path)
                .args(["-fdir", &frames_dir.display().to_string()])
                .args(["-out_dir", &out_dir.display().to_string()])
                .args(["-aus", "-gaze", "-pose"])
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| OpenFaceError::Timeout(ANALYZER_TIMEOUT_SECS))?
        .map_err(|e| OpenFaceError::ExecutionError(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OpenFaceError::AnalysisFailed(format!(
                "Exit code: {:?}, stderr: {}",
                output.status.code(),
                stderr
            )));
        }

        // One CSV per input image; order by filename for deterministic deltas
        let mut csv_paths: Vec<_> = std::fs::read_dir(&out_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().map(|e| e == "csv").unwrap_or(false))
            .collect();
        csv_paths.sort();

        let mut frames = Vec::new();
        for path in &csv_paths {
            let content = std::fs::read_to_string(path)?;
            frames.extend(parse_openface_csv(&content)?);
        }

        let summary = summarize_frames(&frames)?;

        tracing::info!(
            frames_dir = %frames_dir.display(),
            valid_frames = summary.valid_frames,
            gaze_stability = summary.gaze_stability,
            head_stability = summary.head_stability,
            "Facial analysis completed"
        );

        Ok(summary)
    }
}

/// Parse one OpenFace CSV (header + data rows; fields are comma-separated and
/// may carry a leading space)
pub fn parse_openface_csv(content: &str) -> Result<Vec<FrameObservation>, OpenFaceError> {
    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| OpenFaceError::ParseError("empty CSV".to_string()))?;

    let columns: Vec<&str> = header.split(',').map(|c| c.trim()).collect();
    let index_of = |name: &str| columns.iter().position(|c| *c == name);

    let confidence_idx = index_of("confidence")
        .ok_or_else(|| OpenFaceError::ParseError("missing confidence column".to_string()))?;
    let gaze_x_idx = index_of("gaze_angle_x");
    let gaze_y_idx = index_of("gaze_angle_y");
    let pitch_idx = index_of("pose_Rx");
    let yaw_idx = index_of("pose_Ry");
    let roll_idx = index_of("pose_Rz");
    let au_indices: Vec<(usize, String)> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.starts_with("AU") && c.ends_with("_r"))
        .map(|(i, c)| (i, c.to_string()))
        .collect();

    let mut frames = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<f64> = line
            .split(',')
            .map(|f| f.trim().parse::<f64>().unwrap_or(0.0))
            .collect();
        if fields.len() != columns.len() {
            continue;
        }

        let get = |idx: Option<usize>| idx.and_then(|i| fields.get(i)).copied().unwrap_or(0.0);

        let mut aus = BTreeMap::new();
        for (i, name) in &au_indices {
            if let Some(value) = fields.get(*i) {
                aus.insert(name.clone(), *value);
            }
        }

        frames.push(FrameObservation {
            confidence: fields.get(confidence_idx).copied().unwrap_or(0.0),
            gaze_x: get(gaze_x_idx),
            gaze_y: get(gaze_y_idx),
            pitch: get(pitch_idx),
            yaw: get(yaw_idx),
            roll: get(roll_idx),
            aus,
        });
    }

    Ok(frames)
}

/// Average the surviving frames into a summary
pub fn summarize_frames(frames: &[FrameObservation]) -> Result<FacialSummary, OpenFaceError> {
    let valid: Vec<&FrameObservation> = frames
        .iter()
        .filter(|f| f.confidence >= MIN_FRAME_CONFIDENCE)
        .collect();

    if valid.is_empty() {
        return Err(OpenFaceError::NoValidFrames);
    }

    let n = valid.len() as f64;
    let mean = |values: &dyn Fn(&FrameObservation) -> f64| -> f64 {
        valid.iter().map(|f| values(f)).sum::<f64>() / n
    };
    let variance = |values: &dyn Fn(&FrameObservation) -> f64, mean: f64| -> f64 {
        valid.iter().map(|f| (values(f) - mean).powi(2)).sum::<f64>() / n
    };

    let confidence_mean = mean(&|f| f.confidence);
    let confidence_var = variance(&|f| f.confidence, confidence_mean);
    let gaze_x_mean = mean(&|f| f.gaze_x);
    let gaze_x_var = variance(&|f| f.gaze_x, gaze_x_mean);
    let gaze_y_mean = mean(&|f| f.gaze_y);
    let gaze_y_var = variance(&|f| f.gaze_y, gaze_y_mean);
    let pitch_mean = mean(&|f| f.pitch);
    let yaw_mean = mean(&|f| f.yaw);
    let roll_mean = mean(&|f| f.roll);
    let pose_var = variance(&|f| f.pitch, pitch_mean)
        + variance(&|f| f.yaw, yaw_mean)
        + variance(&|f| f.roll, roll_mean);

    // Mean AU intensities across surviving frames
    let mut au_means: BTreeMap<String, f64> = BTreeMap::new();
    for frame in &valid {
        for (name, value) in &frame.aus {
            *au_means.entry(name.clone()).or_insert(0.0) += value / n;
        }
    }

    Ok(FacialSummary {
        confidence_mean,
        confidence_var,
        gaze_x_mean,
        gaze_x_var,
        gaze_y_mean,
        gaze_y_var,
        pitch_mean,
        yaw_mean,
        roll_mean,
        pose_var,
        valid_frames: valid.len(),
        gaze_stability: gaze_stability(&valid),
        head_stability: head_stability(&valid),
        dominant_emotion: dominant_emotion(&au_means),
        au_means,
        degraded: false,
    })
}

/// 1 - (mean frame-to-frame gaze angle change / 0.5 rad), clamped to [0,1]
fn gaze_stability(frames: &[&FrameObservation]) -> f64 {
    if frames.len() < 2 {
        return 1.0;
    }
    let changes: f64 = frames
        .windows(2)
        .map(|pair| {
            ((pair[1].gaze_x - pair[0].gaze_x).abs() + (pair[1].gaze_y - pair[0].gaze_y).abs())
                / 2.0
        })
        .sum::<f64>()
        / (frames.len() - 1) as f64;
    (1.0 - changes / 0.5).clamp(0.0, 1.0)
}

/// 1 - (mean frame-to-frame pose change in degrees / 30°), clamped to [0,1]
fn head_stability(frames: &[&FrameObservation]) -> f64 {
    if frames.len() < 2 {
        return 1.0;
    }
    let changes: f64 = frames
        .windows(2)
        .map(|pair| {
            let delta = ((pair[1].pitch - pair[0].pitch).abs()
                + (pair[1].yaw - pair[0].yaw).abs()
                + (pair[1].roll - pair[0].roll).abs())
                / 3.0;
            delta.to_degrees()
        })
        .sum::<f64>()
        / (frames.len() - 1) as f64;
    (1.0 - changes / 30.0).clamp(0.0, 1.0)
}

/// Dominant emotion from mean Action Unit intensities
pub fn dominant_emotion(au_means: &BTreeMap<String, f64>) -> Emotion {
    let au = |name: &str| au_means.get(name).copied().unwrap_or(0.0);
    let set_score = |names: &[&str]| -> f64 {
        names.iter().map(|n| au(n)).sum::<f64>() / names.len() as f64 / AU_INTENSITY_SCALE
    };

    let joy = set_score(&["AU06_r", "AU12_r", "AU25_r"]);
    let sadness = set_score(&["AU01_r", "AU04_r", "AU15_r"]);
    let anger = set_score(&["AU04_r", "AU05_r", "AU07_r", "AU23_r"]);
    let surprise = set_score(&["AU01_r", "AU02_r", "AU05_r", "AU26_r"]);

    let overall = if au_means.is_empty() {
        0.0
    } else {
        au_means.values().sum::<f64>() / au_means.len() as f64
    };
    let neutral = (1.0 - overall / AU_INTENSITY_SCALE + 0.3).clamp(0.0, 1.5);

    // First maximum wins; order is fixed
    let candidates = [
        (Emotion::Joy, joy),
        (Emotion::Sadness, sadness),
        (Emotion::Anger, anger),
        (Emotion::Surprise, surprise),
        (Emotion::Neutral, neutral),
    ];
    candidates
        .iter()
        .fold(candidates[0], |best, c| if c.1 > best.1 { *c } else { best })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "frame, face_id, timestamp, confidence, gaze_angle_x, gaze_angle_y, pose_Rx, pose_Ry, pose_Rz, AU01_r, AU02_r, AU06_r, AU12_r, AU25_r";

    fn row(
        confidence: f64,
        gaze: (f64, f64),
        pose: (f64, f64, f64),
        aus: (f64, f64, f64, f64, f64),
    ) -> String {
        format!(
            "1, 0, 0.0, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
            confidence, gaze.0, gaze.1, pose.0, pose.1, pose.2, aus.0, aus.1, aus.2, aus.3, aus.4
        )
    }

    #[test]
    fn availability_check_does_not_panic() {
        let available = OpenFaceClient::is_available();
        println!("OpenFace available: {}", available);
    }

    #[test]
    fn parses_header_indexed_columns() {
        let csv = format!(
            "{}\n{}",
            HEADER,
            row(0.93, (0.1, 0.05), (0.02, 0.01, 0.0), (0.5, 0.3, 1.0, 1.2, 0.8))
        );
        let frames = parse_openface_csv(&csv).unwrap();
        assert_eq!(frames.len(), 1);
        assert!((frames[0].confidence - 0.93).abs() < 1e-9);
        assert!((frames[0].gaze_x - 0.1).abs() < 1e-9);
        assert_eq!(frames[0].aus.get("AU12_r"), Some(&1.2));
    }

    #[test]
    fn low_confidence_frames_are_dropped() {
        let csv = format!(
            "{}\n{}\n{}",
            HEADER,
            row(0.2, (0.0, 0.0), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0, 0.0, 0.0)),
            row(0.9, (0.1, 0.1), (0.0, 0.0, 0.0), (0.5, 0.3, 0.2, 0.4, 0.6))
        );
        let frames = parse_openface_csv(&csv).unwrap();
        let summary = summarize_frames(&frames).unwrap();
        assert_eq!(summary.valid_frames, 1);
        assert!((summary.confidence_mean - 0.9).abs() < 1e-9);
    }

    #[test]
    fn zero_survivors_is_an_error() {
        let csv = format!(
            "{}\n{}",
            HEADER,
            row(0.1, (0.0, 0.0), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0, 0.0, 0.0))
        );
        let frames = parse_openface_csv(&csv).unwrap();
        assert!(matches!(
            summarize_frames(&frames),
            Err(OpenFaceError::NoValidFrames)
        ));
    }

    #[test]
    fn steady_frames_yield_full_stability() {
        let csv = format!(
            "{}\n{}\n{}\n{}",
            HEADER,
            row(0.9, (0.1, 0.1), (0.02, 0.02, 0.0), (0.2, 0.2, 0.2, 0.2, 0.2)),
            row(0.9, (0.1, 0.1), (0.02, 0.02, 0.0), (0.2, 0.2, 0.2, 0.2, 0.2)),
            row(0.9, (0.1, 0.1), (0.02, 0.02, 0.0), (0.2, 0.2, 0.2, 0.2, 0.2))
        );
        let frames = parse_openface_csv(&csv).unwrap();
        let summary = summarize_frames(&frames).unwrap();
        assert_eq!(summary.gaze_stability, 1.0);
        assert_eq!(summary.head_stability, 1.0);
    }

    #[test]
    fn erratic_gaze_lowers_stability() {
        let csv = format!(
            "{}\n{}\n{}\n{}",
            HEADER,
            row(0.9, (0.0, 0.0), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0, 0.0, 0.0)),
            row(0.9, (0.6, 0.6), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0, 0.0, 0.0)),
            row(0.9, (0.0, 0.0), (0.0, 0.0, 0.0), (0.0, 0.0, 0.0, 0.0, 0.0))
        );
        let frames = parse_openface_csv(&csv).unwrap();
        let summary = summarize_frames(&frames).unwrap();
        assert!(summary.gaze_stability < 0.1);
    }

    #[test]
    fn smiling_aus_read_as_joy() {
        let mut au_means = BTreeMap::new();
        au_means.insert("AU06_r".to_string(), 2.5);
        au_means.insert("AU12_r".to_string(), 2.8);
        au_means.insert("AU25_r".to_string(), 2.0);
        assert_eq!(dominant_emotion(&au_means), Emotion::Joy);
    }

    #[test]
    fn flat_face_reads_as_neutral() {
        let mut au_means = BTreeMap::new();
        au_means.insert("AU06_r".to_string(), 0.1);
        au_means.insert("AU12_r".to_string(), 0.1);
        assert_eq!(dominant_emotion(&au_means), Emotion::Neutral);
    }
}
