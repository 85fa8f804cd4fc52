//! Per-segment motion analysis from sampled frame differences.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::trace;

use reelcut_media::{downscale_luma, mean_abs_diff, MediaSource};
use reelcut_models::{MotionFeatures, QualityPreset, TimeSegment};

/// Motion analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Seconds between sampled frames inside the segment
    pub sample_stride: f64,
    /// Analysis plane width
    pub frame_width: u32,
    /// Analysis plane height
    pub frame_height: u32,
    /// Mean difference above which the segment has significant motion
    pub significant_threshold: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sample_stride: 0.5,
            frame_width: 320,
            frame_height: 240,
            significant_threshold: 5.0,
        }
    }
}

impl MotionConfig {
    /// Config with the stride taken from a quality preset.
    pub fn for_preset(preset: QualityPreset) -> Self {
        Self {
            sample_stride: preset.motion_sample_stride(),
            ..Self::default()
        }
    }
}

/// Computes motion intensity and peak per segment.
pub struct MotionAnalyzer {
    config: MotionConfig,
}

impl MotionAnalyzer {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    /// Analyze motion inside one segment.
    ///
    /// Returns a zeroed struct, not an error, when fewer than two frames are
    /// readable; unreadable samples in the middle are skipped.
    pub async fn analyze(&self, source: &dyn MediaSource, segment: &TimeSegment) -> MotionFeatures {
        let mut diffs: Vec<f64> = Vec::new();
        let mut prev: Option<GrayImage> = None;

        let mut t = segment.start;
        while t < segment.end {
            match source.frame_at(t).await {
                Ok(frame) => {
                    let plane =
                        downscale_luma(&frame, self.config.frame_width, self.config.frame_height);
                    if let Some(prev_plane) = &prev {
                        diffs.push(mean_abs_diff(prev_plane, &plane));
                    }
                    prev = Some(plane);
                }
                Err(e) => {
                    trace!(t, error = %e, "Skipping unreadable frame in motion analysis");
                }
            }
            t += self.config.sample_stride;
        }

        if diffs.is_empty() {
            return MotionFeatures::zeroed();
        }

        let motion_intensity = diffs.iter().sum::<f64>() / diffs.len() as f64;
        let peak_motion = diffs.iter().cloned().fold(0.0_f64, f64::max);

        MotionFeatures {
            motion_intensity,
            peak_motion,
            has_significant_motion: motion_intensity > self.config.significant_threshold,
        }
    }
}
