//! Per-segment analysis features.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Motion features extracted from sampled frame differences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MotionFeatures {
    /// Mean frame-difference magnitude over sampled pairs (>= 0)
    pub motion_intensity: f64,

    /// Maximum frame-difference magnitude over sampled pairs (>= 0)
    pub peak_motion: f64,

    /// Whether `motion_intensity` exceeded the significance threshold
    pub has_significant_motion: bool,
}

impl MotionFeatures {
    /// Features for a segment where fewer than two frames were readable.
    pub fn zeroed() -> Self {
        Self {
            motion_intensity: 0.0,
            peak_motion: 0.0,
            has_significant_motion: false,
        }
    }
}

/// Audio features computed from framed RMS energy of extracted mono PCM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AudioFeatures {
    /// Mean frame RMS
    pub volume_mean: f64,

    /// Peak frame RMS
    pub volume_peak: f64,

    /// Standard deviation of frame RMS
    pub volume_std: f64,

    /// Count of onset frames (local RMS maxima above the 75th percentile)
    pub num_onsets: usize,

    /// Fraction of frames above the spike threshold, in [0, 1]
    pub spike_ratio: f64,

    /// Normalized excitement score combining loudness, variability, and event density, in [0, 1]
    pub excitement_level: f64,

    /// Fraction of frames below the silence threshold, in [0, 1]
    pub silence_ratio: f64,

    /// Whether peak RMS exceeded the loudness threshold
    pub has_loud_moments: bool,
}

/// Outcome of audio analysis for one segment.
///
/// `Unavailable` is the designated marker for "no audio stream or extraction
/// failed" and is distinguishable from a measured all-silent segment, which
/// arrives as `Measured` with `silence_ratio == 1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AudioSignal {
    /// Features were measured from decoded PCM.
    Measured(AudioFeatures),
    /// No audio stream, or extraction failed. Carries no numeric claims.
    Unavailable,
}

impl AudioSignal {
    /// Excitement level used for scoring; 0.0 when unavailable.
    pub fn excitement(&self) -> f64 {
        match self {
            AudioSignal::Measured(f) => f.excitement_level,
            AudioSignal::Unavailable => 0.0,
        }
    }

    /// Silence ratio; 1.0 when unavailable.
    pub fn silence_ratio(&self) -> f64 {
        match self {
            AudioSignal::Measured(f) => f.silence_ratio,
            AudioSignal::Unavailable => 1.0,
        }
    }

    /// Whether features were actually measured.
    pub fn is_available(&self) -> bool {
        matches!(self, AudioSignal::Measured(_))
    }

    /// Borrow the measured features, if any.
    pub fn as_measured(&self) -> Option<&AudioFeatures> {
        match self {
            AudioSignal::Measured(f) => Some(f),
            AudioSignal::Unavailable => None,
        }
    }
}

/// Optional per-segment scores from an external AI signal provider.
///
/// All scores are normalized to [0, 1]. Absence of the whole struct selects
/// the baseline weighting policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExternalSignal {
    pub face_score: f64,
    pub emotion_score: f64,
    pub speech_score: f64,
    pub has_faces: bool,
    pub has_speech: bool,
}
