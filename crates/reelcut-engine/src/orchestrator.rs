//! Fixed-stage highlight pipeline.
//!
//! ```text
//! Init → Segment → Analyze → Score → SelectInitial
//!      → DiversityPenalize → RescoreSort → SelectFinal → Done
//! ```
//!
//! The only loop-back is the explicit select / penalize / re-select
//! sequence; no stage re-enters an earlier one. Per-segment analysis fans
//! out over a bounded pool of workers, each owning its own decode handle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use metrics::{counter, histogram};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use validator::Validate;

use reelcut_media::{MediaOpener, MediaSource};
use reelcut_models::{
    AudioSignal, EngineConfig, ExternalSignal, HighlightPlan, MotionFeatures, ScoredSegment,
    TimeSegment,
};
use reelcut_signal::{SignalObservation, SignalProvider};

use crate::audio::{AudioConfig, AudioSignalAnalyzer};
use crate::diversity::{DiversityConfig, DiversityScorer};
use crate::error::{EngineError, EngineResult, Stage};
use crate::motion::{MotionAnalyzer, MotionConfig};
use crate::progress::{NoopProgress, ProgressSink};
use crate::scorer::{Scorer, ScoringConfig};
use crate::segmenter::{SceneSegmenter, SegmenterConfig};
use crate::selector::{Selector, SelectorConfig};

/// Runtime knobs for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Analysis workers per video; each owns its own decode handle
    pub analysis_workers: usize,
    /// Total wall-clock budget for external signal calls per video
    pub signal_budget: Duration,
    /// Per-call timeout for external signal requests
    pub signal_call_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            analysis_workers: 4,
            signal_budget: Duration::from_secs(120),
            signal_call_timeout: Duration::from_secs(10),
        }
    }
}

impl EngineOptions {
    /// Create options from environment variables.
    pub fn from_env() -> Self {
        Self {
            analysis_workers: std::env::var("ENGINE_ANALYSIS_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4),
            signal_budget: Duration::from_secs(
                std::env::var("ENGINE_SIGNAL_BUDGET_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            signal_call_timeout: Duration::from_secs(
                std::env::var("ENGINE_SIGNAL_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }
}

/// The highlight selection engine.
///
/// Holds the per-stage components for its lifetime; injected capabilities
/// (the signal provider, the progress sink) are shared references, never
/// module-level singletons. Instances hold no per-video state, so different
/// videos can run through separate engines fully independently.
pub struct HighlightEngine {
    config: EngineConfig,
    segmenter: SceneSegmenter,
    motion: MotionAnalyzer,
    audio: AudioSignalAnalyzer,
    scorer: Scorer,
    selector: Selector,
    diversity: DiversityScorer,
    signal_provider: Option<Arc<dyn SignalProvider>>,
    progress: Arc<dyn ProgressSink>,
    options: EngineOptions,
}

impl HighlightEngine {
    /// Build an engine from the run configuration, deriving per-component
    /// settings (sampling strides, similarity threshold) from it.
    pub fn new(config: EngineConfig) -> Self {
        let diversity = DiversityScorer::new(DiversityConfig {
            similarity_threshold: config.similarity_threshold,
            ..DiversityConfig::default()
        });

        Self {
            segmenter: SceneSegmenter::new(SegmenterConfig::default()),
            motion: MotionAnalyzer::new(MotionConfig::for_preset(config.quality)),
            audio: AudioSignalAnalyzer::new(AudioConfig::default()),
            scorer: Scorer::new(ScoringConfig::default()),
            selector: Selector::new(SelectorConfig::default()),
            diversity,
            signal_provider: None,
            progress: Arc::new(NoopProgress),
            options: EngineOptions::default(),
            config,
        }
    }

    /// Attach an external AI signal provider.
    pub fn with_signal_provider(mut self, provider: Arc<dyn SignalProvider>) -> Self {
        self.signal_provider = Some(provider);
        self
    }

    /// Attach a progress sink.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Override runtime options.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the scoring weight configuration.
    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scorer = Scorer::new(scoring);
        self
    }

    /// Override the selector thresholds.
    pub fn with_selector(mut self, selector: SelectorConfig) -> Self {
        self.selector = Selector::new(selector);
        self
    }

    /// Run the full pipeline and produce a highlight plan.
    ///
    /// `video_ref` is the locator handed to the external signal provider;
    /// the engine itself reads media only through `opener`.
    pub async fn run(
        &self,
        opener: &dyn MediaOpener,
        video_ref: &str,
        cancel: &CancellationToken,
    ) -> EngineResult<HighlightPlan> {
        let run_started = Instant::now();
        counter!("reelcut_runs_total").increment(1);

        // Init
        self.enter(Stage::Init);
        self.config
            .validate()
            .map_err(|e| EngineError::config(Stage::Init, e.to_string()))?;
        if !self.config.duration_bounds_ordered() {
            return Err(EngineError::config(
                Stage::Init,
                "min_segment_duration exceeds max_segment_duration",
            ));
        }

        let source = opener
            .open()
            .await
            .map_err(|e| EngineError::unreadable_input(Stage::Init, e.to_string()))?;
        let duration = source.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(EngineError::unreadable_input(
                Stage::Init,
                format!("source reports duration {duration}"),
            ));
        }

        // Segment
        self.enter(Stage::Segment);
        let segments = self.segmenter.segment(source.as_ref()).await;
        if segments.is_empty() {
            return Err(EngineError::NoSegments {
                stage: Stage::Segment,
            });
        }
        histogram!("reelcut_segments_per_video").record(segments.len() as f64);

        // Analyze
        self.enter(Stage::Analyze);
        let features = self.analyze_segments(opener, &segments, cancel).await?;

        // Score
        self.enter(Stage::Score);
        let mut scored = Vec::with_capacity(segments.len());
        let mut signal_budget = self.options.signal_budget;
        for (segment, (motion, audio)) in segments.iter().zip(features) {
            let external = self.fetch_signal(video_ref, segment, &mut signal_budget).await;
            let score = self
                .scorer
                .score(segment, &motion, &audio, external.as_ref(), duration);
            scored.push(ScoredSegment::new(*segment, motion, audio, external, score));
        }

        // SelectInitial
        self.checkpoint(cancel, Stage::SelectInitial)?;
        self.enter(Stage::SelectInitial);
        let initial = self.selector.select_indices(
            &scored,
            self.config.target_duration,
            self.config.min_segment_duration,
            self.config.max_segment_duration,
        );
        debug!(selected = initial.len(), "Initial selection complete");

        // DiversityPenalize: penalties suppress redundant high scorers among
        // the initial picks, then the whole candidate pool is re-ranked.
        self.checkpoint(cancel, Stage::DiversityPenalize)?;
        self.enter(Stage::DiversityPenalize);
        let mut picked: Vec<ScoredSegment> =
            initial.iter().map(|&idx| scored[idx].clone()).collect();
        self.diversity.penalize(source.as_ref(), &mut picked).await;
        for (k, &idx) in initial.iter().enumerate() {
            scored[idx] = picked[k].clone();
        }

        // RescoreSort
        self.enter(Stage::RescoreSort);
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    a.segment
                        .start
                        .partial_cmp(&b.segment.start)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        // SelectFinal
        self.checkpoint(cancel, Stage::SelectFinal)?;
        self.enter(Stage::SelectFinal);
        let selection = self.selector.select(
            &scored,
            self.config.target_duration,
            self.config.min_segment_duration,
            self.config.max_segment_duration,
        );
        if selection.is_empty() {
            return Err(EngineError::SelectionEmpty {
                stage: Stage::SelectFinal,
            });
        }

        // Done
        let diversity_score = self
            .diversity
            .diversity_score(source.as_ref(), &selection.segments)
            .await;
        let plan = HighlightPlan::from_selection(
            selection,
            duration,
            self.config.target_duration,
            scored.len(),
            diversity_score,
        );

        histogram!("reelcut_selection_duration_seconds").record(plan.total_duration);
        histogram!("reelcut_run_duration_seconds").record(run_started.elapsed().as_secs_f64());
        counter!("reelcut_runs_completed_total").increment(1);

        self.enter(Stage::Done);
        info!(
            source_duration = duration,
            selected = plan.selection.len(),
            total_duration = plan.total_duration,
            diversity = plan.diversity_score,
            "Highlight plan ready"
        );

        Ok(plan)
    }

    /// Fan per-segment analysis out over the worker pool.
    ///
    /// Each worker opens its own decode handle; a worker that cannot open
    /// one degrades its segments to zeroed/unavailable features rather than
    /// failing the run. Cancellation is honored at segment boundaries.
    async fn analyze_segments(
        &self,
        opener: &dyn MediaOpener,
        segments: &[TimeSegment],
        cancel: &CancellationToken,
    ) -> EngineResult<Vec<(MotionFeatures, AudioSignal)>> {
        let n = segments.len();
        let workers = self.options.analysis_workers.max(1).min(n);

        let worker_futures = (0..workers).map(|w| {
            let idxs: Vec<usize> = (w..n).step_by(workers).collect();
            async move {
                let handle = match opener.open().await {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        warn!(
                            worker = w,
                            error = %e,
                            "Analysis worker could not open a decode handle"
                        );
                        None
                    }
                };

                let mut out = Vec::with_capacity(idxs.len());
                for idx in idxs {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let segment = &segments[idx];
                    let features = match &handle {
                        Some(source) => {
                            let motion = self.motion.analyze(source.as_ref(), segment).await;
                            let audio = self.audio.analyze(source.as_ref(), segment).await;
                            (motion, audio)
                        }
                        None => (MotionFeatures::zeroed(), AudioSignal::Unavailable),
                    };
                    out.push((idx, features));
                }
                out
            }
        });

        let results = join_all(worker_futures).await;

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled {
                stage: Stage::Analyze,
            });
        }

        let mut features: Vec<Option<(MotionFeatures, AudioSignal)>> = vec![None; n];
        for chunk in results {
            for (idx, f) in chunk {
                features[idx] = Some(f);
            }
        }

        Ok(features
            .into_iter()
            .map(|f| f.unwrap_or((MotionFeatures::zeroed(), AudioSignal::Unavailable)))
            .collect())
    }

    /// Ask the signal provider about one segment, within the remaining
    /// wall-clock budget. Timeouts and provider outages degrade to `None`,
    /// which selects the baseline weighting policy for that segment.
    async fn fetch_signal(
        &self,
        video_ref: &str,
        segment: &TimeSegment,
        budget: &mut Duration,
    ) -> Option<ExternalSignal> {
        let provider = self.signal_provider.as_ref()?;
        if budget.is_zero() {
            return None;
        }

        let call_timeout = self.options.signal_call_timeout.min(*budget);
        let started = Instant::now();
        let result = tokio::time::timeout(
            call_timeout,
            provider.analyze_segment(video_ref, segment.start, segment.end),
        )
        .await;
        *budget = budget.saturating_sub(started.elapsed());

        match result {
            Ok(SignalObservation::Measured(signal)) => Some(signal),
            Ok(SignalObservation::Unavailable) => None,
            Err(_) => {
                warn!(
                    start = segment.start,
                    end = segment.end,
                    "Signal call timed out, using baseline weights for segment"
                );
                None
            }
        }
    }

    fn enter(&self, stage: Stage) {
        self.progress.stage(stage, stage.progress_percent());
    }

    fn checkpoint(&self, cancel: &CancellationToken, stage: Stage) -> EngineResult<()> {
        if cancel.is_cancelled() {
            Err(EngineError::Cancelled { stage })
        } else {
            Ok(())
        }
    }
}
