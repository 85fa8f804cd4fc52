//! Importance scoring with baseline and AI-enhanced weighting policies.

use serde::{Deserialize, Serialize};

use reelcut_models::{AudioSignal, ExternalSignal, MotionFeatures, TimeSegment};

/// Weights for the baseline policy (no external signal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineWeights {
    pub excitement: f64,
    pub position: f64,
    pub quality: f64,
    pub motion_indicator: f64,
    pub motion_intensity: f64,
}

impl Default for BaselineWeights {
    fn default() -> Self {
        Self {
            excitement: 0.30,
            position: 0.25,
            quality: 0.20,
            motion_indicator: 0.25,
            motion_intensity: 0.003,
        }
    }
}

/// Weights for the AI-enhanced policy (external signal present).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedWeights {
    pub emotion: f64,
    pub speech: f64,
    pub face: f64,
    pub excitement: f64,
    pub motion_intensity: f64,
    pub position: f64,
}

impl Default for EnhancedWeights {
    fn default() -> Self {
        Self {
            emotion: 0.30,
            speech: 0.25,
            face: 0.15,
            excitement: 0.15,
            motion_intensity: 0.001,
            position: 0.05,
        }
    }
}

/// Scoring configuration. The weight vectors are deliberately configuration
/// rather than constants; the defaults carry the tuned production values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub baseline: BaselineWeights,
    pub enhanced: EnhancedWeights,
    pub quality: QualityMapping,
}

/// Mapping from motion intensity to the quality proxy score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMapping {
    pub floor: f64,
    pub ceiling: f64,
    pub motion_gain: f64,
}

impl Default for QualityMapping {
    fn default() -> Self {
        Self {
            floor: 0.5,
            ceiling: 0.9,
            motion_gain: 0.01,
        }
    }
}

/// Combines motion, audio, optional external signals, and positional
/// heuristics into one importance score per segment.
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score one segment. Presence of `external` selects the AI-enhanced
    /// policy; otherwise the baseline policy applies.
    pub fn score(
        &self,
        segment: &TimeSegment,
        motion: &MotionFeatures,
        audio: &AudioSignal,
        external: Option<&ExternalSignal>,
        video_duration: f64,
    ) -> f64 {
        let position = self.position_score(segment.position_ratio(video_duration));

        match external {
            Some(signal) => {
                let w = &self.config.enhanced;
                w.emotion * signal.emotion_score
                    + w.speech * signal.speech_score
                    + w.face * signal.face_score
                    + w.excitement * audio.excitement()
                    + w.motion_intensity * motion.motion_intensity
                    + w.position * position
            }
            None => {
                let w = &self.config.baseline;
                let motion_indicator = if motion.has_significant_motion {
                    1.0
                } else {
                    0.0
                };
                w.excitement * audio.excitement()
                    + w.position * position
                    + w.quality * self.quality_score(motion.motion_intensity)
                    + w.motion_indicator * motion_indicator
                    + w.motion_intensity * motion.motion_intensity
            }
        }
    }

    /// Positional heuristic: intros score highest, outros next, midpoints
    /// moderately; everything else contributes nothing. Models the narrative
    /// weight distribution observed in casual footage.
    pub fn position_score(&self, position_ratio: f64) -> f64 {
        if position_ratio < 0.1 {
            1.0
        } else if position_ratio > 0.9 {
            0.8
        } else if position_ratio > 0.45 && position_ratio < 0.55 {
            0.5
        } else {
            0.0
        }
    }

    /// Quality proxy derived from motion intensity, clamped to the
    /// configured band.
    fn quality_score(&self, motion_intensity: f64) -> f64 {
        let q = &self.config.quality;
        (q.floor + q.motion_gain * motion_intensity).clamp(q.floor, q.ceiling)
    }
}
