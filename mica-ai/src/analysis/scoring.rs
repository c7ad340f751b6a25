//! Deterministic scoring engine
//!
//! Maps one `MultimodalObservation` onto the seven score axes. All formulas
//! are pure arithmetic over the analyzer summaries; analyzer failure shows up
//! only through the degraded flags, which drive the floor rule:
//! a degraded analyzer never drives its dependent axes below 2.0, and total
//! failure additionally ceilings every axis at 3.0.

use crate::models::{Axis, MultimodalObservation, ScoreVector};

/// Reasoning connective buckets; one hit per bucket feeds the logic axis
const BECAUSE: &[&str] = &["왜냐하면", "때문", "because"];
const THEREFORE: &[&str] = &["따라서", "그러므로", "therefore"];
const ORDINAL: &[&str] = &["첫째", "둘째", "셋째", "first", "second", "third"];
const CONCLUSION: &[&str] = &["결론적으로", "마지막으로", "in conclusion"];

const CONNECTIVE_BUCKETS: [&[&str]; 4] = [BECAUSE, THEREFORE, ORDINAL, CONCLUSION];

/// Keyword buckets for the collaborative and problem-solving axes
const COLLABORATION_KEYWORDS: &[&str] = &["팀", "협업", "협력", "소통", "함께", "조율"];
const SOLUTION_KEYWORDS: &[&str] = &["해결", "방안", "대안", "개선", "전략", "접근"];

/// Comfortable speaking tempo band (BPM of the onset estimate)
const TEMPO_BAND: (f64, f64) = (100.0, 140.0);

/// Comfortable loudness band (mean RMS of the normalized track)
const RMS_BAND: (f64, f64) = (0.1, 0.5);

/// Score one observation
pub fn score(observation: &MultimodalObservation) -> ScoreVector {
    let transcript = &observation.transcript;
    let facial = &observation.facial;
    let acoustic = &observation.acoustic;

    let lower = transcript.text.to_lowercase();
    let words = transcript.word_count() as f64;
    let empty_transcript = transcript.text.trim().is_empty();

    // Broken analyzer values substitute their degraded defaults before use
    let fluency = sane(acoustic.fluency, 0.5);
    let voice_stability = sane(acoustic.voice_stability, 0.5);
    let tempo = sane(acoustic.tempo, 0.0);
    let rms_mean = sane(acoustic.rms_mean, 0.0);
    let facial_confidence = sane(facial.confidence_mean, 0.9);
    let gaze_stability = sane(facial.gaze_stability, 1.0);
    let head_stability = sane(facial.head_stability, 1.0);

    let fluency_penalty = if fluency < 0.5 { 0.5 } else { 0.0 };
    let communication = 3.0 + words / 50.0 - fluency_penalty;
    let logic = 3.0 + 0.5 * connective_buckets_hit(&lower) as f64;
    let collaborative = 3.0 + 0.5 * distinct_keywords(&lower, COLLABORATION_KEYWORDS) as f64;
    let problem_solving = 3.0 + 0.5 * distinct_keywords(&lower, SOLUTION_KEYWORDS) as f64;

    let initiative = 3.0 + facial_confidence;
    let action = 3.0 + gaze_stability + head_stability - 1.0;

    let tempo_bonus = if in_band(tempo, TEMPO_BAND) { 0.5 } else { 0.0 };
    let rms_bonus = if in_band(rms_mean, RMS_BAND) { 0.5 } else { 0.0 };
    let voice = 3.0 + voice_stability + tempo_bonus + rms_bonus;

    let mut scores = ScoreVector::rounded(
        initiative,
        collaborative,
        communication,
        logic,
        problem_solving,
        voice,
        action,
    );

    // No recognized speech: the content axes are exactly 2.0
    if empty_transcript {
        scores.communication = 2.0;
        scores.logic = 2.0;
        scores.collaborative = 2.0;
        scores.problem_solving = 2.0;
    }

    if transcript.degraded {
        scores.floor_at(2.0, &Axis::CONTENT);
    }
    if facial.degraded {
        scores.floor_at(2.0, &Axis::FACIAL);
    }
    if acoustic.degraded {
        scores.floor_at(2.0, &Axis::ACOUSTIC);
    }
    if observation.is_total_failure() {
        scores.floor_at(2.0, &Axis::ALL);
        scores.ceil_at(3.0, &Axis::ALL);
    }

    scores
}

/// Does the (already lowercased or short) text carry any reasoning connective
pub fn contains_connective(text: &str) -> bool {
    let lower = text.to_lowercase();
    CONNECTIVE_BUCKETS
        .iter()
        .any(|bucket| bucket.iter().any(|term| lower.contains(term)))
}

fn connective_buckets_hit(lower: &str) -> usize {
    CONNECTIVE_BUCKETS
        .iter()
        .filter(|bucket| bucket.iter().any(|term| lower.contains(term)))
        .count()
}

fn distinct_keywords(lower: &str, bucket: &[&str]) -> usize {
    bucket.iter().filter(|term| lower.contains(*term)).count()
}

fn sane(value: f64, default: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        default
    } else {
        value
    }
}

fn in_band(value: f64, band: (f64, f64)) -> bool {
    value >= band.0 && value <= band.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AcousticSummary, FacialSummary, Transcript};

    fn observation_with(text: &str) -> MultimodalObservation {
        let mut transcript = Transcript::degraded_default();
        transcript.text = text.to_string();
        transcript.degraded = false;

        let mut facial = FacialSummary::degraded_default();
        facial.degraded = false;
        let mut acoustic = AcousticSummary::degraded_default();
        acoustic.degraded = false;

        MultimodalObservation {
            transcript,
            facial,
            acoustic,
            coherence: 0.6,
            key_arguments: Vec::new(),
        }
    }

    #[test]
    fn empty_transcript_pins_content_axes_at_two() {
        let scores = score(&observation_with(""));
        assert_eq!(scores.communication, 2.0);
        assert_eq!(scores.logic, 2.0);
        assert_eq!(scores.collaborative, 2.0);
        assert_eq!(scores.problem_solving, 2.0);
        // Non-content axes keep their computed values
        assert!(scores.initiative > 3.0);
    }

    #[test]
    fn communication_grows_with_words_and_pays_for_disfluency() {
        let long_text = "단어 ".repeat(100);
        let mut obs = observation_with(long_text.trim());
        obs.acoustic.fluency = 0.9;
        assert_eq!(score(&obs).communication, 5.0);

        let mut obs = observation_with("스물 다섯 단어보다 적은 짧은 답변");
        obs.acoustic.fluency = 0.2;
        // 3.0 + 6/50 - 0.5 = 2.62 → 2.6
        assert_eq!(score(&obs).communication, 2.6);
    }

    #[test]
    fn logic_counts_buckets_not_occurrences() {
        let obs = observation_with("왜냐하면 그렇기 때문입니다");
        // Both terms are in the because-bucket: one bucket hit
        assert_eq!(score(&obs).logic, 3.5);

        let obs = observation_with("왜냐하면 어렵습니다. 따라서 첫째로 준비했고 결론적으로 성공했습니다");
        assert_eq!(score(&obs).logic, 5.0);
    }

    #[test]
    fn english_connectives_match_case_insensitively() {
        let obs = observation_with("Because of that, I applied. Therefore I studied.");
        assert_eq!(score(&obs).logic, 4.0);
    }

    #[test]
    fn initiative_follows_facial_confidence() {
        let mut obs = observation_with("답변");
        obs.facial.confidence_mean = 0.93;
        assert_eq!(score(&obs).initiative, 3.9);
    }

    #[test]
    fn action_combines_the_two_stabilities() {
        let mut obs = observation_with("답변");
        obs.facial.gaze_stability = 1.0;
        obs.facial.head_stability = 1.0;
        assert_eq!(score(&obs).action, 4.0);

        obs.facial.gaze_stability = 0.5;
        obs.facial.head_stability = 0.5;
        assert_eq!(score(&obs).action, 3.0);
    }

    #[test]
    fn voice_bonuses_require_the_comfort_bands() {
        let mut obs = observation_with("답변");
        obs.acoustic.voice_stability = 0.7;
        obs.acoustic.tempo = 120.0;
        obs.acoustic.rms_mean = 0.3;
        assert_eq!(score(&obs).voice, 4.7);

        obs.acoustic.tempo = 90.0;
        obs.acoustic.rms_mean = 0.05;
        assert_eq!(score(&obs).voice, 3.7);
    }

    #[test]
    fn collaborative_counts_distinct_keywords() {
        let obs = observation_with("팀에서 협업하며 소통했습니다. 팀! 팀!");
        // 팀, 협업, 소통: three distinct keywords
        assert_eq!(score(&obs).collaborative, 4.5);
    }

    #[test]
    fn problem_solving_counts_its_own_bucket() {
        let obs = observation_with("문제 해결을 위해 개선 방안을 찾았습니다");
        assert_eq!(score(&obs).problem_solving, 4.5);
    }

    #[test]
    fn degraded_stt_floors_content_axes() {
        let mut obs = observation_with("");
        obs.transcript.degraded = true;
        let scores = score(&obs);
        for axis_score in [
            scores.communication,
            scores.logic,
            scores.collaborative,
            scores.problem_solving,
        ] {
            assert!(axis_score >= 2.0);
        }
    }

    #[test]
    fn total_failure_lands_every_axis_in_band() {
        let obs = MultimodalObservation {
            transcript: Transcript::degraded_default(),
            facial: FacialSummary::degraded_default(),
            acoustic: AcousticSummary::degraded_default(),
            coherence: 0.5,
            key_arguments: Vec::new(),
        };
        let scores = score(&obs);
        for axis_score in scores.as_array() {
            assert!((2.0..=3.0).contains(&axis_score), "score {}", axis_score);
        }
    }

    #[test]
    fn nan_analyzer_values_substitute_defaults() {
        let mut obs = observation_with("답변입니다");
        obs.acoustic.fluency = f64::NAN;
        obs.acoustic.voice_stability = f64::NAN;
        obs.facial.confidence_mean = -3.0;

        let scores = score(&obs);
        // fluency default 0.5: no penalty; stability default 0.5
        assert_eq!(scores.voice, 3.5);
        // facial confidence default 0.9
        assert_eq!(scores.initiative, 3.9);
    }

    #[test]
    fn every_axis_is_one_decimal_in_contract_range() {
        let obs = observation_with("팀 협업 해결 왜냐하면 따라서 답변입니다");
        for axis_score in score(&obs).as_array() {
            assert!((1.0..=5.0).contains(&axis_score));
            let tenths = axis_score * 10.0;
            assert!((tenths - tenths.round()).abs() < 1e-9);
        }
    }
}
