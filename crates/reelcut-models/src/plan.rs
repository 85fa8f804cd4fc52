//! Final highlight plan handed to the embedding service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::scored::{ClipWindow, Selection};

/// The orchestrator's output: the final chronological selection plus the
/// run metadata the job layer records alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HighlightPlan {
    /// Duration of the source video in seconds
    pub source_duration: f64,

    /// Requested highlight duration in seconds
    pub target_duration: f64,

    /// Number of candidate segments that were analyzed
    pub segments_considered: usize,

    /// The final selection after the diversity re-selection pass
    pub selection: Selection,

    /// Renderer contract: chronological clip windows within configured bounds
    pub clip_windows: Vec<ClipWindow>,

    /// Total rendered duration of the selection in seconds
    pub total_duration: f64,

    /// `source_duration / total_duration`; 0 when the selection is empty
    pub compression_ratio: f64,

    /// Mean pairwise visual dissimilarity of the final selection, in [0, 1]
    pub diversity_score: f64,

    /// When the plan was computed
    pub computed_at: chrono::DateTime<chrono::Utc>,
}

impl HighlightPlan {
    /// Assemble a plan from a final selection.
    pub fn from_selection(
        selection: Selection,
        source_duration: f64,
        target_duration: f64,
        segments_considered: usize,
        diversity_score: f64,
    ) -> Self {
        let clip_windows = selection.clip_windows();
        let total_duration = selection.total_duration();
        let compression_ratio = if total_duration > 0.0 {
            source_duration / total_duration
        } else {
            0.0
        };

        Self {
            source_duration,
            target_duration,
            segments_considered,
            selection,
            clip_windows,
            total_duration,
            compression_ratio,
            diversity_score,
            computed_at: chrono::Utc::now(),
        }
    }
}
