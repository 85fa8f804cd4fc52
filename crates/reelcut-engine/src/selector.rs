//! Greedy duration-constrained selection with a relaxation pass.

use serde::{Deserialize, Serialize};
use tracing::debug;

use reelcut_models::{ScoredSegment, Selection};

/// Selection thresholds. Ratios are fractions of the target duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Greedy pass ignores candidates scoring below this floor
    pub min_score: f64,
    /// Greedy pass stops once this fraction of the target is reached
    pub stop_ratio: f64,
    /// Relaxation pass runs when the greedy pass fills less than this
    pub relax_trigger_ratio: f64,
    /// Relaxation pass stops once this fraction of the target is reached
    pub relax_stop_ratio: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_score: 0.2,
            stop_ratio: 0.95,
            relax_trigger_ratio: 0.70,
            relax_stop_ratio: 0.90,
        }
    }
}

/// Duration-constrained greedy picker.
pub struct Selector {
    config: SelectorConfig,
}

impl Selector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Indices of accepted candidates, in the order they were accepted.
    ///
    /// Greedy pass walks candidates in descending score order, clamping each
    /// usable duration to `max_seg`, skipping anything below `min_seg` or
    /// under the score floor. If the total then sits below the relaxation
    /// trigger, a second pass revisits the remaining candidates regardless
    /// of score and accepts any that fit, so low-variety footage still
    /// yields a non-trivial highlight instead of an empty one.
    pub fn select_indices(
        &self,
        candidates: &[ScoredSegment],
        target: f64,
        min_seg: f64,
        max_seg: f64,
    ) -> Vec<usize> {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            candidates[b]
                .score
                .partial_cmp(&candidates[a].score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    candidates[a]
                        .segment
                        .start
                        .partial_cmp(&candidates[b].segment.start)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        let mut accepted: Vec<usize> = Vec::new();
        let mut taken = vec![false; candidates.len()];
        let mut total = 0.0;

        for &idx in &order {
            if candidates[idx].score < self.config.min_score {
                continue;
            }
            let usable = candidates[idx].segment.duration().min(max_seg);
            if usable < min_seg {
                continue;
            }
            if total + usable <= target {
                accepted.push(idx);
                taken[idx] = true;
                total += usable;
            }
            if total >= self.config.stop_ratio * target {
                break;
            }
        }

        if total < self.config.relax_trigger_ratio * target {
            debug!(
                total,
                target, "Greedy pass under-filled, running relaxation pass"
            );

            for &idx in &order {
                if taken[idx] {
                    continue;
                }
                let usable = candidates[idx].segment.duration().min(max_seg);
                if usable < min_seg {
                    continue;
                }
                if total + usable <= target {
                    accepted.push(idx);
                    taken[idx] = true;
                    total += usable;
                }
                if total >= self.config.relax_stop_ratio * target {
                    break;
                }
            }
        }

        debug!(
            selected = accepted.len(),
            total, target, "Selection pass complete"
        );

        accepted
    }

    /// Select a chronological subset within the duration budget.
    pub fn select(
        &self,
        candidates: &[ScoredSegment],
        target: f64,
        min_seg: f64,
        max_seg: f64,
    ) -> Selection {
        let accepted = self.select_indices(candidates, target, min_seg, max_seg);
        Selection::new(
            accepted
                .into_iter()
                .map(|idx| candidates[idx].clone())
                .collect(),
            max_seg,
        )
    }
}
