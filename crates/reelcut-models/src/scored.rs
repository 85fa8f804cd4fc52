//! Scored segments, selections, and renderer clip windows.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::features::{AudioSignal, ExternalSignal, MotionFeatures};
use crate::segment::TimeSegment;

/// A candidate segment with its features and importance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoredSegment {
    /// The time window under consideration
    pub segment: TimeSegment,

    /// Motion features (zeroed when fewer than two frames were readable)
    pub motion: MotionFeatures,

    /// Audio features or the unavailable marker
    pub audio: AudioSignal,

    /// External AI signal, when the provider produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalSignal>,

    /// Importance score as assigned by the scorer, never mutated afterwards
    pub raw_score: f64,

    /// Effective score; equals `raw_score * (1 - diversity_penalty)`
    pub score: f64,

    /// Diversity penalty in [0, 1]; 0 until the diversity pass runs
    pub diversity_penalty: f64,
}

impl ScoredSegment {
    /// Create a scored segment. The penalty starts at zero and the
    /// effective score equals the raw score.
    pub fn new(
        segment: TimeSegment,
        motion: MotionFeatures,
        audio: AudioSignal,
        external: Option<ExternalSignal>,
        score: f64,
    ) -> Self {
        Self {
            segment,
            motion,
            audio,
            external,
            raw_score: score,
            score,
            diversity_penalty: 0.0,
        }
    }

    /// Apply a diversity penalty, rescaling from the immutable raw score.
    ///
    /// Recomputing from `raw_score` instead of the current `score` makes
    /// repeated application with the same penalty a no-op, and the effective
    /// score can never exceed the raw score.
    pub fn apply_diversity_penalty(&mut self, penalty: f64) {
        let penalty = penalty.clamp(0.0, 1.0);
        self.diversity_penalty = penalty;
        self.score = self.raw_score * (1.0 - penalty);
    }
}

/// A `{start, end}` window handed to the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipWindow {
    pub start: f64,
    pub end: f64,
}

impl ClipWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A chronological subset of scored segments within the duration budget.
///
/// Members are ordered ascending by start time. Each member's rendered
/// duration is its segment duration capped at `max_segment_duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Selection {
    /// Selected segments in chronological order
    pub segments: Vec<ScoredSegment>,

    /// Cap applied to each member's rendered duration
    pub max_segment_duration: f64,
}

impl Selection {
    /// Build a selection, sorting members by start time.
    pub fn new(mut segments: Vec<ScoredSegment>, max_segment_duration: f64) -> Self {
        segments.sort_by(|a, b| {
            a.segment
                .start
                .partial_cmp(&b.segment.start)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self {
            segments,
            max_segment_duration,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Total rendered duration, with each member capped at the max.
    pub fn total_duration(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.segment.duration().min(self.max_segment_duration))
            .sum()
    }

    /// The `{start, end}` list owed to the renderer: chronological, each
    /// window capped at `max_segment_duration`.
    pub fn clip_windows(&self) -> Vec<ClipWindow> {
        self.segments
            .iter()
            .map(|s| ClipWindow {
                start: s.segment.start,
                end: s
                    .segment
                    .end
                    .min(s.segment.start + self.max_segment_duration),
            })
            .collect()
    }
}
