//! Per-segment audio analysis from framed RMS energy.

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use reelcut_media::MediaSource;
use reelcut_models::{AudioFeatures, AudioSignal, TimeSegment};

/// Normalization and weighting for the excitement score.
///
/// The score is a weighted sum of five sub-scores, each independently
/// clamped to [0, 1] before weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcitementTuning {
    /// Weight of the volume sub-score
    pub volume_weight: f64,
    /// Weight of the RMS variability sub-score
    pub variability_weight: f64,
    /// Weight of the onset density sub-score
    pub onset_weight: f64,
    /// Weight of the spike density sub-score
    pub spike_weight: f64,
    /// Weight of the spectral-flux proxy sub-score
    pub flux_weight: f64,

    /// Gain applied to mean RMS before clamping
    pub volume_gain: f64,
    /// Gain applied to RMS std before clamping
    pub variability_gain: f64,
    /// Onset count that saturates the onset sub-score
    pub onset_saturation: f64,
    /// Spike count that saturates the spike sub-score
    pub spike_saturation: f64,
    /// Flux value that saturates the flux sub-score
    pub flux_saturation: f64,
}

impl Default for ExcitementTuning {
    fn default() -> Self {
        Self {
            volume_weight: 0.30,
            variability_weight: 0.20,
            onset_weight: 0.25,
            spike_weight: 0.15,
            flux_weight: 0.10,
            volume_gain: 3.0,
            variability_gain: 5.0,
            onset_saturation: 10.0,
            spike_saturation: 20.0,
            flux_saturation: 10.0,
        }
    }
}

/// Audio analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// PCM extraction sample rate
    pub sample_rate: u32,
    /// RMS frame length in samples
    pub frame_len: usize,
    /// RMS hop length in samples
    pub hop_len: usize,
    /// RMS below this counts as silence
    pub silence_threshold: f64,
    /// Percentile of RMS used for onset and spike thresholds
    pub event_percentile: f64,
    /// Peak RMS above this marks loud moments
    pub loud_peak_threshold: f64,
    /// Excitement score tuning
    pub excitement: ExcitementTuning,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            frame_len: 2048,
            hop_len: 512,
            silence_threshold: 0.01,
            event_percentile: 75.0,
            loud_peak_threshold: 0.3,
            excitement: ExcitementTuning::default(),
        }
    }
}

/// Computes loudness, onset, spike, and silence statistics per segment.
pub struct AudioSignalAnalyzer {
    config: AudioConfig,
}

impl AudioSignalAnalyzer {
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    /// Analyze the audio of one segment.
    ///
    /// Never raises to the caller: a missing audio stream, a failed
    /// extraction, or a span too short to frame all return
    /// [`AudioSignal::Unavailable`].
    pub async fn analyze(&self, source: &dyn MediaSource, segment: &TimeSegment) -> AudioSignal {
        if !source.has_audio() {
            return AudioSignal::Unavailable;
        }

        let samples = match source
            .pcm_in_segment(segment.start, segment.end, self.config.sample_rate)
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                warn!(
                    start = segment.start,
                    end = segment.end,
                    error = %e,
                    "Audio extraction failed, marking segment unavailable"
                );
                return AudioSignal::Unavailable;
            }
        };

        match self.features_from_pcm(&samples) {
            Some(features) => AudioSignal::Measured(features),
            None => AudioSignal::Unavailable,
        }
    }

    /// Compute features from raw mono PCM. `None` when the span is too
    /// short to produce a single RMS frame.
    fn features_from_pcm(&self, samples: &[f32]) -> Option<AudioFeatures> {
        let rms = frame_rms(samples, self.config.frame_len, self.config.hop_len);
        if rms.is_empty() {
            return None;
        }

        let n = rms.len() as f64;
        let volume_mean = rms.iter().sum::<f64>() / n;
        let volume_peak = rms.iter().cloned().fold(0.0_f64, f64::max);
        let volume_std =
            (rms.iter().map(|v| (v - volume_mean).powi(2)).sum::<f64>() / n).sqrt();

        let event_threshold = percentile(&rms, self.config.event_percentile);

        // Onset frames: local maxima above the percentile threshold
        let mut num_onsets = 0usize;
        for i in 1..rms.len().saturating_sub(1) {
            if rms[i] > event_threshold && rms[i] > rms[i - 1] && rms[i] > rms[i + 1] {
                num_onsets += 1;
            }
        }

        let num_spikes = rms.iter().filter(|v| **v > event_threshold).count();
        let spike_ratio = num_spikes as f64 / n;

        let silence_frames = rms
            .iter()
            .filter(|v| **v < self.config.silence_threshold)
            .count();
        let silence_ratio = silence_frames as f64 / n;

        // Spectral-flux proxy: mean rate of change of RMS energy
        let flux = if rms.len() > 1 {
            rms.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>() / (rms.len() - 1) as f64
        } else {
            0.0
        };

        let excitement_level =
            self.excitement_score(volume_mean, volume_std, num_onsets, num_spikes, flux);

        trace!(
            frames = rms.len(),
            volume_mean,
            num_onsets,
            num_spikes,
            excitement_level,
            "Audio features computed"
        );

        Some(AudioFeatures {
            volume_mean,
            volume_peak,
            volume_std,
            num_onsets,
            spike_ratio,
            excitement_level,
            silence_ratio,
            has_loud_moments: volume_peak > self.config.loud_peak_threshold,
        })
    }

    /// Weighted sum of five independently clamped sub-scores.
    fn excitement_score(
        &self,
        volume_mean: f64,
        volume_std: f64,
        num_onsets: usize,
        num_spikes: usize,
        flux: f64,
    ) -> f64 {
        let t = &self.config.excitement;

        let volume_score = (volume_mean * t.volume_gain).min(1.0);
        let variability_score = (volume_std * t.variability_gain).min(1.0);
        let onset_score = (num_onsets as f64 / t.onset_saturation).min(1.0);
        let spike_score = (num_spikes as f64 / t.spike_saturation).min(1.0);
        let flux_score = (flux / t.flux_saturation).min(1.0);

        volume_score * t.volume_weight
            + variability_score * t.variability_weight
            + onset_score * t.onset_weight
            + spike_score * t.spike_weight
            + flux_score * t.flux_weight
    }
}

/// RMS energy per frame of length `frame_len`, hopping by `hop_len`.
fn frame_rms(samples: &[f32], frame_len: usize, hop_len: usize) -> Vec<f64> {
    if samples.len() < frame_len || frame_len == 0 || hop_len == 0 {
        return Vec::new();
    }

    let mut rms = Vec::with_capacity((samples.len() - frame_len) / hop_len + 1);
    let mut start = 0;
    while start + frame_len <= samples.len() {
        let frame = &samples[start..start + frame_len];
        let energy: f64 = frame.iter().map(|s| (*s as f64) * (*s as f64)).sum();
        rms.push((energy / frame_len as f64).sqrt());
        start += hop_len;
    }
    rms
}

/// Linearly interpolated percentile of an unsorted slice.
fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}
