//! Near-duplicate suppression over representative frames.
//!
//! One frame is sampled at each segment's temporal midpoint and downscaled;
//! a symmetric pairwise similarity matrix then drives per-segment penalties
//! or a greedy distinct-representatives filter. Penalties only suppress
//! redundant high scorers; they never remove a segment outright. The caller
//! re-sorts by updated score and re-runs selection.

mod compare;

use image::DynamicImage;
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use reelcut_media::{MediaSource, downscale_luma};
use reelcut_models::ScoredSegment;

pub use compare::{default_comparator, FrameComparator, HistogramComparator};

#[cfg(feature = "phash")]
pub use compare::AverageHashComparator;

/// Diversity analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversityConfig {
    /// Similarity above this marks a near-duplicate pair
    pub similarity_threshold: f64,
    /// Representative frame width
    pub frame_width: u32,
    /// Representative frame height
    pub frame_height: u32,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.80,
            frame_width: 320,
            frame_height: 240,
        }
    }
}

/// Penalizes visually redundant segments and filters for distinct ones.
pub struct DiversityScorer {
    config: DiversityConfig,
    comparator: Box<dyn FrameComparator>,
}

impl DiversityScorer {
    /// Create a scorer with the comparator picked for this build.
    pub fn new(config: DiversityConfig) -> Self {
        let comparator = default_comparator();
        debug!(comparator = comparator.name(), "Diversity scorer ready");
        Self { config, comparator }
    }

    /// Create a scorer with an explicit comparator.
    pub fn with_comparator(config: DiversityConfig, comparator: Box<dyn FrameComparator>) -> Self {
        Self { config, comparator }
    }

    /// Apply diversity penalties to the given segments in place.
    ///
    /// Each segment's penalty combines how many near-duplicate neighbors it
    /// has with how far its closest neighbor overshoots the threshold;
    /// scores are rescaled from the immutable raw score, so re-applying with
    /// the same threshold changes nothing. Segments whose representative
    /// frame cannot be read keep a zero penalty.
    pub async fn penalize(&self, source: &dyn MediaSource, segments: &mut [ScoredSegment]) {
        if segments.len() <= 1 {
            for seg in segments.iter_mut() {
                seg.apply_diversity_penalty(0.0);
            }
            return;
        }

        let frames = self.representative_frames(source, segments).await;
        let matrix = self.similarity_matrix(&frames);

        for i in 0..segments.len() {
            let penalty = if frames[i].is_some() {
                self.segment_penalty(i, &matrix)
            } else {
                0.0
            };

            trace!(
                index = i,
                penalty,
                raw_score = segments[i].raw_score,
                "Applying diversity penalty"
            );
            segments[i].apply_diversity_penalty(penalty);
        }
    }

    /// Greedily keep visually distinct candidates.
    ///
    /// The top scorer is always kept; each later candidate survives only if
    /// its similarity to every kept representative stays at or below the
    /// threshold. Stops at `target_distinct` picks or candidate exhaustion.
    pub async fn ensure_diversity(
        &self,
        source: &dyn MediaSource,
        candidates: &[ScoredSegment],
        target_distinct: usize,
    ) -> Vec<ScoredSegment> {
        if candidates.len() <= target_distinct {
            return candidates.to_vec();
        }

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            candidates[b]
                .score
                .partial_cmp(&candidates[a].score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let frames = self.representative_frames(source, candidates).await;

        let mut kept: Vec<usize> = Vec::new();
        for &idx in &order {
            if kept.is_empty() {
                kept.push(idx);
            } else {
                let distinct = kept.iter().all(|&kept_idx| {
                    match (&frames[idx], &frames[kept_idx]) {
                        (Some(a), Some(b)) => {
                            self.comparator.compare(a, b) <= self.config.similarity_threshold
                        }
                        // An unreadable frame cannot be proven redundant
                        _ => true,
                    }
                });
                if distinct {
                    kept.push(idx);
                }
            }

            if kept.len() >= target_distinct {
                break;
            }
        }

        debug!(
            candidates = candidates.len(),
            kept = kept.len(),
            "Diversity filtering complete"
        );

        kept.into_iter().map(|idx| candidates[idx].clone()).collect()
    }

    /// Mean pairwise dissimilarity of the segments, in [0, 1].
    /// A set of zero or one segments is perfectly diverse.
    pub async fn diversity_score(
        &self,
        source: &dyn MediaSource,
        segments: &[ScoredSegment],
    ) -> f64 {
        if segments.len() <= 1 {
            return 1.0;
        }

        let frames = self.representative_frames(source, segments).await;
        let matrix = self.similarity_matrix(&frames);

        let n = segments.len();
        let mut sum = 0.0;
        let mut pairs = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                sum += matrix[[i, j]];
                pairs += 1;
            }
        }

        1.0 - sum / pairs as f64
    }

    /// Symmetric pairwise similarity matrix with a unit diagonal.
    ///
    /// Pairs involving an unreadable representative frame read as 0
    /// (nothing can be called a duplicate of a frame nobody saw).
    pub fn similarity_matrix(&self, frames: &[Option<DynamicImage>]) -> Array2<f64> {
        let n = frames.len();
        let mut matrix = Array2::<f64>::zeros((n, n));

        let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((i, j));
            }
        }

        let sims: Vec<(usize, usize, f64)> = pairs
            .par_iter()
            .map(|&(i, j)| {
                let sim = match (&frames[i], &frames[j]) {
                    (Some(a), Some(b)) => self.comparator.compare(a, b),
                    _ => 0.0,
                };
                (i, j, sim)
            })
            .collect();

        for (i, j, sim) in sims {
            matrix[[i, j]] = sim;
            matrix[[j, i]] = sim;
        }
        for i in 0..n {
            matrix[[i, i]] = 1.0;
        }

        matrix
    }

    /// One downscaled frame per segment, sampled at the temporal midpoint.
    pub async fn representative_frames(
        &self,
        source: &dyn MediaSource,
        segments: &[ScoredSegment],
    ) -> Vec<Option<DynamicImage>> {
        let mut frames = Vec::with_capacity(segments.len());
        for seg in segments {
            let frame = match source.frame_at(seg.segment.midpoint()).await {
                Ok(frame) => {
                    let small =
                        downscale_luma(&frame, self.config.frame_width, self.config.frame_height);
                    Some(DynamicImage::ImageLuma8(small))
                }
                Err(e) => {
                    trace!(
                        midpoint = seg.segment.midpoint(),
                        error = %e,
                        "Representative frame unreadable"
                    );
                    None
                }
            };
            frames.push(frame);
        }
        frames
    }

    /// Penalty for one segment given the similarity matrix.
    ///
    /// `count_penalty` is the fraction of other segments above the
    /// threshold; `similarity_penalty` is how far the closest neighbor
    /// overshoots it, normalized to the remaining headroom.
    fn segment_penalty(&self, index: usize, matrix: &Array2<f64>) -> f64 {
        let n = matrix.nrows();
        if n <= 1 {
            return 0.0;
        }

        let threshold = self.config.similarity_threshold;
        let mut num_similar = 0usize;
        let mut max_similarity = 0.0f64;

        for j in 0..n {
            if j == index {
                continue;
            }
            let sim = matrix[[index, j]];
            if sim > threshold {
                num_similar += 1;
            }
            max_similarity = max_similarity.max(sim);
        }

        let num_others = (n - 1) as f64;
        let count_penalty = (num_similar as f64 / num_others).min(1.0);
        let similarity_penalty = ((max_similarity - threshold).max(0.0)) / (1.0 - threshold);

        0.5 * count_penalty + 0.5 * similarity_penalty
    }
}
