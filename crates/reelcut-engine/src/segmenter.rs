//! Scene segmentation via frame-difference thresholding.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use reelcut_media::{downscale_luma, mean_abs_diff, MediaSource};
use reelcut_models::TimeSegment;

/// Segmentation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Seconds between sampled frames
    pub sample_stride: f64,
    /// Analysis plane width
    pub frame_width: u32,
    /// Analysis plane height
    pub frame_height: u32,
    /// Mean |Δluma| above which a boundary is cut (0-255 scale)
    pub cut_threshold: f64,
    /// A boundary is only cut once the open scene reaches this length
    pub min_scene_len: f64,
    /// Window length for the fixed-window fallback
    pub fallback_window: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            sample_stride: 1.0,
            frame_width: 160,
            frame_height: 120,
            cut_threshold: 30.0,
            min_scene_len: 2.0,
            fallback_window: 5.0,
        }
    }
}

/// Splits the timeline into candidate windows.
///
/// Output segments always tile `[0, duration]` exactly, with no gaps or
/// overlaps, and are never empty for a positive duration: when no boundary
/// is found (static footage, unreadable frames) the segmenter falls back to
/// fixed-length windows.
pub struct SceneSegmenter {
    config: SegmenterConfig,
}

impl SceneSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Segment the video into an ordered, gapless cover of `[0, duration]`.
    ///
    /// Unreadable sample frames are skipped; they can suppress boundaries
    /// but never fail the stage.
    pub async fn segment(&self, source: &dyn MediaSource) -> Vec<TimeSegment> {
        let duration = source.duration();
        if duration <= 0.0 {
            return Vec::new();
        }

        let cuts = self.detect_boundaries(source, duration).await;

        if cuts.is_empty() {
            debug!(
                duration,
                window = self.config.fallback_window,
                "No scene boundaries found, falling back to fixed windows"
            );
            return fixed_windows(duration, self.config.fallback_window);
        }

        let mut segments = Vec::with_capacity(cuts.len() + 1);
        let mut open_start = 0.0;
        for cut in cuts {
            segments.push(TimeSegment::new(open_start, cut));
            open_start = cut;
        }
        // Trailing scene is always appended
        if duration > open_start {
            segments.push(TimeSegment::new(open_start, duration));
        }

        debug!(scenes = segments.len(), duration, "Scene segmentation done");
        segments
    }

    /// Sample frames at the configured stride and collect cut timestamps.
    async fn detect_boundaries(&self, source: &dyn MediaSource, duration: f64) -> Vec<f64> {
        let mut cuts = Vec::new();
        let mut prev: Option<GrayImage> = None;
        let mut open_start = 0.0;

        let mut t = 0.0;
        while t < duration {
            match source.frame_at(t).await {
                Ok(frame) => {
                    let plane =
                        downscale_luma(&frame, self.config.frame_width, self.config.frame_height);

                    if let Some(prev_plane) = &prev {
                        let diff = mean_abs_diff(prev_plane, &plane);
                        trace!(t, diff, "Sampled frame difference");

                        if diff > self.config.cut_threshold
                            && t - open_start >= self.config.min_scene_len
                        {
                            cuts.push(t);
                            open_start = t;
                        }
                    }

                    prev = Some(plane);
                }
                Err(e) => {
                    trace!(t, error = %e, "Skipping unreadable sample frame");
                }
            }

            t += self.config.sample_stride;
        }

        cuts
    }
}

/// Fixed-length windows spanning `[0, duration]`.
fn fixed_windows(duration: f64, window: f64) -> Vec<TimeSegment> {
    let mut segments = Vec::new();
    let mut t = 0.0;
    while t < duration {
        let end = (t + window).min(duration);
        segments.push(TimeSegment::new(t, end));
        t = end;
    }
    segments
}
