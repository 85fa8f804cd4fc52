//! Engine configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Analysis fidelity preset.
///
/// Presets trade analysis time for feature resolution by narrowing the
/// frame sampling stride; they never change scoring semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    /// Coarse sampling, fastest turnaround
    Fast,
    /// Default sampling density
    Balanced,
    /// Dense sampling for short or high-motion footage
    High,
}

impl QualityPreset {
    /// Frame sampling stride for motion analysis, in seconds.
    pub fn motion_sample_stride(&self) -> f64 {
        match self {
            QualityPreset::Fast => 1.0,
            QualityPreset::Balanced => 0.5,
            QualityPreset::High => 0.25,
        }
    }
}

/// Top-level configuration for a highlight run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct EngineConfig {
    /// Target total duration of the highlight cut, in seconds
    #[validate(range(min = 1.0))]
    pub target_duration: f64,

    /// Segments rendered shorter than this are skipped, in seconds
    #[validate(range(min = 0.1))]
    pub min_segment_duration: f64,

    /// Cap on each rendered segment's duration, in seconds
    #[validate(range(min = 0.1))]
    pub max_segment_duration: f64,

    /// Analysis fidelity preset
    pub quality: QualityPreset,

    /// Representative frames with similarity above this are near-duplicates
    #[validate(range(min = 0.01, max = 0.99))]
    pub similarity_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_duration: 180.0,
            min_segment_duration: 1.0,
            max_segment_duration: 10.0,
            quality: QualityPreset::Balanced,
            similarity_threshold: 0.80,
        }
    }
}

impl EngineConfig {
    /// Cross-field check not expressible as a range attribute.
    pub fn duration_bounds_ordered(&self) -> bool {
        self.min_segment_duration <= self.max_segment_duration
    }
}
