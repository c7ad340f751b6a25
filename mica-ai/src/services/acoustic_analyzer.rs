//! Acoustic analysis over the extracted 16 kHz mono WAV
//!
//! In-process feature extraction: windowed RMS and zero-crossing rate,
//! spectral centroid stability, 13 MFCC means, autocorrelation pitch, and an
//! onset-flux tempo estimate. All features feed the ACOUSTIC score axes.

use std::f64::consts::PI;
use std::path::Path;
use thiserror::Error;

use crate::models::AcousticSummary;

/// Analysis frame length in samples (power of two)
const FRAME_SIZE: usize = 512;

/// Hop between consecutive frames in samples
const HOP_SIZE: usize = 256;

/// Frames with RMS below this are treated as silence
const SILENCE_RMS: f64 = 0.01;

/// Pitch search range (Hz)
const PITCH_MIN_HZ: f64 = 50.0;
const PITCH_MAX_HZ: f64 = 400.0;

/// Minimum normalized autocorrelation for a frame to count as voiced
const VOICED_MIN_CORR: f64 = 0.3;

/// Tempo search range (BPM)
const TEMPO_MIN_BPM: f64 = 60.0;
const TEMPO_MAX_BPM: f64 = 180.0;

/// Number of mel filters and output cepstral coefficients
const NUM_MEL_FILTERS: usize = 26;
const NUM_MFCC: usize = 13;

/// Acoustic analyzer errors
#[derive(Debug, Error)]
pub enum AcousticError {
    /// Failed to read or decode the WAV file
    #[error("Failed to read WAV: {0}")]
    ReadError(String),

    /// Audio shorter than one analysis frame
    #[error("Audio too short for analysis")]
    EmptyAudio,
}

/// In-process acoustic analyzer
pub struct AcousticAnalyzer;

impl AcousticAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a WAV file (any channel count / bit depth hound can read)
    pub fn analyze_wav(&self, path: &Path) -> Result<AcousticSummary, AcousticError> {
        let mut reader =
            hound::WavReader::open(path).map_err(|e| AcousticError::ReadError(e.to_string()))?;
        let spec = reader.spec();
        let channels = spec.channels as usize;

        let interleaved: Vec<f64> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .filter_map(Result::ok)
                .map(|s| s as f64)
                .collect(),
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
                reader
                    .samples::<i32>()
                    .filter_map(Result::ok)
                    .map(|s| s as f64 / scale)
                    .collect()
            }
        };

        let mono: Vec<f64> = if channels > 1 {
            interleaved
                .chunks(channels)
                .map(|c| c.iter().sum::<f64>() / channels as f64)
                .collect()
        } else {
            interleaved
        };

        let summary = self.analyze_samples(&mono, spec.sample_rate)?;

        tracing::info!(
            path = %path.display(),
            samples = mono.len(),
            pitch_mean = summary.pitch_mean,
            tempo = summary.tempo,
            fluency = summary.fluency,
            "Acoustic analysis completed"
        );

        Ok(summary)
    }

    /// Analyze mono samples in [-1, 1]
    pub fn analyze_samples(
        &self,
        samples: &[f64],
        sample_rate: u32,
    ) -> Result<AcousticSummary, AcousticError> {
        if samples.len() < FRAME_SIZE || sample_rate == 0 {
            return Err(AcousticError::EmptyAudio);
        }

        let window = hann_window(FRAME_SIZE);
        let filterbank = mel_filterbank(NUM_MEL_FILTERS, FRAME_SIZE, sample_rate);

        let mut rms_values = Vec::new();
        let mut zcr_values = Vec::new();
        let mut centroids = Vec::new();
        let mut pitches = Vec::new();
        let mut flux = Vec::new();
        let mut mfcc_acc = vec![0.0; NUM_MFCC];
        let mut mfcc_frames = 0usize;
        let mut prev_spectrum: Option<Vec<f64>> = None;

        for start in (0..=samples.len() - FRAME_SIZE).step_by(HOP_SIZE) {
            let frame = &samples[start..start + FRAME_SIZE];

            let rms = (frame.iter().map(|s| s * s).sum::<f64>() / FRAME_SIZE as f64).sqrt();
            rms_values.push(rms);
            zcr_values.push(zero_crossing_rate(frame));

            let windowed: Vec<f64> = frame.iter().zip(&window).map(|(s, w)| s * w).collect();
            let mags = fft_magnitudes(&windowed);

            if let Some(prev) = &prev_spectrum {
                flux.push(
                    mags.iter()
                        .zip(prev)
                        .map(|(cur, p)| (cur - p).max(0.0))
                        .sum(),
                );
            }

            if rms >= SILENCE_RMS {
                if let Some(c) = spectral_centroid(&mags, sample_rate, FRAME_SIZE) {
                    centroids.push(c);
                }
                if let Some(p) = autocorrelation_pitch(frame, sample_rate) {
                    pitches.push(p);
                }
                let coeffs = mfcc(&mags, &filterbank);
                for (acc, c) in mfcc_acc.iter_mut().zip(&coeffs) {
                    *acc += c;
                }
                mfcc_frames += 1;
            }

            prev_spectrum = Some(mags);
        }

        let total_frames = rms_values.len();
        let silent_frames = rms_values.iter().filter(|r| **r < SILENCE_RMS).count();
        let silence_ratio = silent_frames as f64 / total_frames as f64;

        let (pitch_mean, pitch_std) = mean_std(&pitches);
        let (rms_mean, rms_std) = mean_std(&rms_values);
        let (zcr_mean, _) = mean_std(&zcr_values);
        let (centroid_mean, centroid_std) = mean_std(&centroids);

        let mfcc_means = if mfcc_frames > 0 {
            mfcc_acc
                .iter()
                .map(|acc| acc / mfcc_frames as f64)
                .collect()
        } else {
            vec![0.0; NUM_MFCC]
        };

        Ok(AcousticSummary {
            pitch_mean,
            pitch_std,
            rms_mean,
            rms_std,
            tempo: estimate_tempo(&flux, sample_rate as f64 / HOP_SIZE as f64),
            zero_crossing_rate: zcr_mean,
            mfcc_means,
            voice_stability: stability_ratio(centroid_mean, centroid_std),
            volume_consistency: stability_ratio(rms_mean, rms_std),
            fluency: (1.0 - 2.0 * silence_ratio).clamp(0.0, 1.0),
            degraded: false,
        })
    }
}

impl Default for AcousticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / (n - 1) as f64).cos()))
        .collect()
}

fn zero_crossing_rate(frame: &[f64]) -> f64 {
    let crossings = frame
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();
    crossings as f64 / frame.len() as f64
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, var.sqrt())
}

/// 1 - (std / mean), clamped to [0,1]; 0.5 when the mean carries no signal
fn stability_ratio(mean: f64, std: f64) -> f64 {
    if mean <= f64::EPSILON {
        return 0.5;
    }
    (1.0 - (std / mean).clamp(0.0, 1.0)).clamp(0.0, 1.0)
}

/// Iterative radix-2 FFT; returns magnitudes for bins 0..=n/2
fn fft_magnitudes(frame: &[f64]) -> Vec<f64> {
    let n = frame.len();
    debug_assert!(n.is_power_of_two());
    let mut re: Vec<f64> = frame.to_vec();
    let mut im = vec![0.0; n];

    // Bit-reversal permutation
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let angle = -2.0 * PI / len as f64;
        let (wr, wi) = (angle.cos(), angle.sin());
        for start in (0..n).step_by(len) {
            let (mut cr, mut ci) = (1.0, 0.0);
            for k in 0..len / 2 {
                let (er, ei) = (re[start + k], im[start + k]);
                let (or_, oi) = (re[start + k + len / 2], im[start + k + len / 2]);
                let (tr, ti) = (or_ * cr - oi * ci, or_ * ci + oi * cr);
                re[start + k] = er + tr;
                im[start + k] = ei + ti;
                re[start + k + len / 2] = er - tr;
                im[start + k + len / 2] = ei - ti;
                let next_cr = cr * wr - ci * wi;
                ci = cr * wi + ci * wr;
                cr = next_cr;
            }
        }
        len <<= 1;
    }

    (0..=n / 2)
        .map(|k| (re[k] * re[k] + im[k] * im[k]).sqrt())
        .collect()
}

/// Magnitude-weighted mean frequency; None for an empty spectrum
fn spectral_centroid(mags: &[f64], sample_rate: u32, frame_size: usize) -> Option<f64> {
    let total: f64 = mags.iter().sum();
    if total < 1e-9 {
        return None;
    }
    let bin_hz = sample_rate as f64 / frame_size as f64;
    let weighted: f64 = mags
        .iter()
        .enumerate()
        .map(|(k, m)| k as f64 * bin_hz * m)
        .sum();
    Some(weighted / total)
}

/// Fundamental frequency by normalized autocorrelation peak picking
fn autocorrelation_pitch(frame: &[f64], sample_rate: u32) -> Option<f64> {
    let n = frame.len();
    let r0: f64 = frame.iter().map(|s| s * s).sum();
    if r0 < 1e-9 {
        return None;
    }

    let lag_min = (sample_rate as f64 / PITCH_MAX_HZ) as usize;
    let lag_max = ((sample_rate as f64 / PITCH_MIN_HZ) as usize).min(n - 1);
    if lag_min == 0 || lag_min >= lag_max {
        return None;
    }

    let mut best_lag = 0;
    let mut best_corr = 0.0;
    for lag in lag_min..=lag_max {
        let r: f64 = (0..n - lag).map(|i| frame[i] * frame[i + lag]).sum();
        let normalized = r / r0;
        if normalized > best_corr {
            best_corr = normalized;
            best_lag = lag;
        }
    }

    if best_corr > VOICED_MIN_CORR && best_lag > 0 {
        Some(sample_rate as f64 / best_lag as f64)
    } else {
        None
    }
}

/// Tempo (BPM) from the autocorrelation of the onset flux envelope
fn estimate_tempo(flux: &[f64], frame_rate: f64) -> f64 {
    let lag_min = (frame_rate * 60.0 / TEMPO_MAX_BPM).ceil() as usize;
    let lag_max = (frame_rate * 60.0 / TEMPO_MIN_BPM).floor() as usize;
    if lag_min == 0 || flux.len() <= lag_max + 1 {
        return 0.0;
    }

    let mean = flux.iter().sum::<f64>() / flux.len() as f64;
    let centered: Vec<f64> = flux.iter().map(|f| f - mean).collect();
    let r0: f64 = centered.iter().map(|f| f * f).sum();
    if r0 < 1e-9 {
        return 0.0;
    }

    let mut best_lag = 0;
    let mut best_corr = 0.0;
    for lag in lag_min..=lag_max {
        let r: f64 = (0..centered.len() - lag)
            .map(|i| centered[i] * centered[i + lag])
            .sum::<f64>()
            / r0;
        if r > best_corr {
            best_corr = r;
            best_lag = lag;
        }
    }

    if best_corr > 0.1 && best_lag > 0 {
        60.0 * frame_rate / best_lag as f64
    } else {
        0.0
    }
}

fn hz_to_mel(f: f64) -> f64 {
    2595.0 * (1.0 + f / 700.0).log10()
}

fn mel_to_hz(m: f64) -> f64 {
    700.0 * (10f64.powf(m / 2595.0) - 1.0)
}

/// Triangular mel filters as sparse (bin, weight) lists
fn mel_filterbank(
    num_filters: usize,
    frame_size: usize,
    sample_rate: u32,
) -> Vec<Vec<(usize, f64)>> {
    let nyquist = sample_rate as f64 / 2.0;
    let mel_max = hz_to_mel(nyquist);
    let points: Vec<usize> = (0..num_filters + 2)
        .map(|i| {
            let hz = mel_to_hz(mel_max * i as f64 / (num_filters + 1) as f64);
            ((hz * frame_size as f64 / sample_rate as f64).round() as usize).min(frame_size / 2)
        })
        .collect();

    (0..num_filters)
        .map(|f| {
            let (lo, mid, hi) = (points[f], points[f + 1], points[f + 2]);
            let mut weights = Vec::new();
            for bin in lo..=hi {
                let w = if bin < mid {
                    if mid == lo {
                        0.0
                    } else {
                        (bin - lo) as f64 / (mid - lo) as f64
                    }
                } else if hi == mid {
                    0.0
                } else {
                    (hi - bin) as f64 / (hi - mid) as f64
                };
                if w > 0.0 {
                    weights.push((bin, w));
                }
            }
            weights
        })
        .collect()
}

/// Mel-frequency cepstral coefficients via log filterbank energies and DCT-II
fn mfcc(mags: &[f64], filterbank: &[Vec<(usize, f64)>]) -> Vec<f64> {
    let log_energies: Vec<f64> = filterbank
        .iter()
        .map(|filter| {
            let energy: f64 = filter.iter().map(|(bin, w)| mags[*bin].powi(2) * w).sum();
            (energy + 1e-10).ln()
        })
        .collect();

    let m = log_energies.len() as f64;
    (0..NUM_MFCC)
        .map(|i| {
            log_energies
                .iter()
                .enumerate()
                .map(|(j, le)| le * (PI * i as f64 * (j as f64 + 0.5) / m).cos())
                .sum()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 16000;

    fn sine(freq: f64, amplitude: f64, seconds: f64) -> Vec<f64> {
        let n = (SR as f64 * seconds) as usize;
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / SR as f64).sin())
            .collect()
    }

    #[test]
    fn steady_sine_pitch_and_stability() {
        let samples = sine(220.0, 0.5, 1.0);
        let summary = AcousticAnalyzer::new().analyze_samples(&samples, SR).unwrap();

        assert!((summary.pitch_mean - 220.0).abs() < 20.0, "pitch {}", summary.pitch_mean);
        assert!(summary.voice_stability > 0.9);
        assert!(summary.volume_consistency > 0.9);
        assert_eq!(summary.fluency, 1.0);
        assert_eq!(summary.mfcc_means.len(), 13);
        assert!(!summary.degraded);
    }

    #[test]
    fn pure_silence_has_zero_fluency() {
        let samples = vec![0.0; SR as usize];
        let summary = AcousticAnalyzer::new().analyze_samples(&samples, SR).unwrap();

        assert_eq!(summary.fluency, 0.0);
        assert_eq!(summary.pitch_mean, 0.0);
        assert_eq!(summary.tempo, 0.0);
        // No spectral signal: stability falls back to the neutral midpoint
        assert_eq!(summary.voice_stability, 0.5);
        assert_eq!(summary.volume_consistency, 0.5);
    }

    #[test]
    fn quarter_silence_halves_fluency() {
        let mut samples = sine(440.0, 0.5, 1.5);
        samples.extend(vec![0.0; SR as usize / 2]);
        let summary = AcousticAnalyzer::new().analyze_samples(&samples, SR).unwrap();

        assert!((summary.fluency - 0.5).abs() < 0.1, "fluency {}", summary.fluency);
    }

    #[test]
    fn regular_bursts_read_as_tempo() {
        // A 100 ms burst every 500 ms = 120 BPM of onsets
        let burst = sine(440.0, 0.8, 0.1);
        let gap = vec![0.0; (SR as f64 * 0.4) as usize];
        let mut samples = Vec::new();
        for _ in 0..8 {
            samples.extend_from_slice(&burst);
            samples.extend_from_slice(&gap);
        }
        let summary = AcousticAnalyzer::new().analyze_samples(&samples, SR).unwrap();

        assert!((summary.tempo - 120.0).abs() < 12.0, "tempo {}", summary.tempo);
    }

    #[test]
    fn too_short_audio_is_rejected() {
        let samples = vec![0.1; FRAME_SIZE - 1];
        assert!(matches!(
            AcousticAnalyzer::new().analyze_samples(&samples, SR),
            Err(AcousticError::EmptyAudio)
        ));
    }

    #[test]
    fn fft_resolves_a_tone_near_its_bin() {
        let samples = sine(440.0, 0.5, 1.0);
        let window = hann_window(FRAME_SIZE);
        let windowed: Vec<f64> = samples[..FRAME_SIZE]
            .iter()
            .zip(&window)
            .map(|(s, w)| s * w)
            .collect();
        let mags = fft_magnitudes(&windowed);
        let centroid = spectral_centroid(&mags, SR, FRAME_SIZE).unwrap();
        // Bin width is 31.25 Hz; windowing spreads a little energy outward
        assert!((centroid - 440.0).abs() < 60.0, "centroid {}", centroid);
    }

    #[test]
    fn reads_wav_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SR,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in sine(220.0, 0.5, 0.5) {
            writer.write_sample((s * i16::MAX as f64) as i16).unwrap();
        }
        writer.finalize().unwrap();

        let summary = AcousticAnalyzer::new().analyze_wav(&path).unwrap();
        assert!((summary.pitch_mean - 220.0).abs() < 15.0, "pitch {}", summary.pitch_mean);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = AcousticAnalyzer::new().analyze_wav(Path::new("/nonexistent/audio.wav"));
        assert!(matches!(result, Err(AcousticError::ReadError(_))));
    }
}
