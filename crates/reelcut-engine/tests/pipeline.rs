//! End-to-end pipeline behavior on synthetic footage.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use reelcut_engine::{
    DiversityConfig, DiversityScorer, EngineError, HighlightEngine, SceneSegmenter,
    SegmenterConfig, Selector, SelectorConfig,
};
use reelcut_media::{MediaOpener, MediaResult, MediaSource};
use reelcut_models::{
    AudioSignal, EngineConfig, ExternalSignal, MotionFeatures, ScoredSegment, TimeSegment,
};
use reelcut_signal::{SignalObservation, SignalProvider};

use support::{
    bursty_pcm, pattern_frame, pattern_video, static_silent_video, Pattern, SyntheticOpener,
    SyntheticVideo,
};

fn config(target: f64) -> EngineConfig {
    EngineConfig {
        target_duration: target,
        min_segment_duration: 1.0,
        max_segment_duration: 10.0,
        ..EngineConfig::default()
    }
}

fn scored(start: f64, end: f64, score: f64) -> ScoredSegment {
    ScoredSegment::new(
        TimeSegment::new(start, end),
        MotionFeatures::zeroed(),
        AudioSignal::Unavailable,
        None,
        score,
    )
}

/// Scenario: a static, silent video must still yield a highlight through
/// the fixed-window fallback and the relaxation pass, never a
/// `SelectionEmpty` error.
#[tokio::test]
async fn static_silent_video_yields_highlight() {
    let opener = static_silent_video(60.0).into_opener();
    let engine = HighlightEngine::new(config(10.0));

    let plan = engine
        .run(&opener, "static.mp4", &CancellationToken::new())
        .await
        .expect("static footage must not fail selection");

    assert_eq!(
        plan.segments_considered, 12,
        "60s static video falls back to 5s windows"
    );
    assert!(!plan.selection.is_empty());
    assert!(plan.total_duration <= 10.0 + 1e-9);
}

/// Scene segmentation exactly tiles `[0, duration]` with no gaps or
/// overlaps, whether boundaries were found or the fallback ran.
#[tokio::test]
async fn segmenter_output_tiles_duration() {
    let videos = vec![
        pattern_video(
            8.0,
            vec![
                Pattern::Solid(20),
                Pattern::Solid(120),
                Pattern::Solid(220),
                Pattern::Solid(60),
            ],
        ),
        static_silent_video(43.0),
    ];

    for video in videos {
        let duration = video.duration();
        let segments = SceneSegmenter::new(SegmenterConfig::default())
            .segment(&video)
            .await;

        assert!(!segments.is_empty());
        assert_eq!(segments[0].start, 0.0);
        assert!((segments.last().unwrap().end - duration).abs() < 1e-9);
        for pair in segments.windows(2) {
            assert!((pair[0].end - pair[1].start).abs() < 1e-9);
        }
        for seg in &segments {
            assert!(seg.validate(duration).is_ok());
        }
    }
}

/// Scenario: two segments with identical representative frames and one
/// genuinely distinct, lower-scoring segment. After the penalty pass, one
/// duplicate must rank below the distinct segment.
#[tokio::test]
async fn identical_segments_demoted_below_distinct() {
    let video = pattern_video(
        10.0,
        vec![Pattern::VSplit, Pattern::VSplit, Pattern::Solid(128)],
    );

    let mut segments = vec![
        scored(0.0, 10.0, 0.9),
        scored(10.0, 20.0, 0.85),
        scored(20.0, 30.0, 0.5),
    ];

    let diversity = DiversityScorer::new(DiversityConfig::default());
    diversity.penalize(&video, &mut segments).await;

    segments.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());

    let distinct_rank = segments
        .iter()
        .position(|s| s.segment.start == 20.0)
        .unwrap();
    assert!(
        distinct_rank < 2,
        "distinct segment must outrank at least one duplicate"
    );
    for seg in &segments {
        assert!(seg.score <= seg.raw_score, "penalties never raise scores");
    }
}

/// Property: re-selection after the diversity penalty keeps filling toward
/// the target and pulls in the distinct candidates once the near-duplicates
/// are suppressed. Pattern distinctness here relies on the perceptual-hash
/// comparator.
#[cfg(feature = "phash")]
#[tokio::test]
async fn reselection_recovers_distinct_candidates() {
    // 25 scenes of 5s: twenty identical splits, then five distinct patterns
    let mut patterns = vec![Pattern::VSplit; 20];
    patterns.extend([
        Pattern::VSplitInv,
        Pattern::HSplit,
        Pattern::HSplitInv,
        Pattern::Checker,
        Pattern::Solid(128),
    ]);
    let video = pattern_video(5.0, patterns);

    let mut candidates: Vec<ScoredSegment> = (0..25)
        .map(|i| {
            let start = i as f64 * 5.0;
            let score = if i < 20 { 0.9 } else { 0.3 };
            scored(start, start + 5.0, score)
        })
        .collect();

    let target = 125.0;
    let selector = Selector::new(SelectorConfig::default());
    let diversity = DiversityScorer::new(DiversityConfig::default());

    // Initial pass takes everything that fits
    let initial = selector.select_indices(&candidates, target, 1.0, 10.0);

    // Penalize the picks, write updated scores back
    let mut picked: Vec<ScoredSegment> = initial.iter().map(|&i| candidates[i].clone()).collect();
    diversity.penalize(&video, &mut picked).await;
    for (k, &i) in initial.iter().enumerate() {
        candidates[i] = picked[k].clone();
    }

    // Re-sort and re-select
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
    let selection = selector.select(&candidates, target, 1.0, 10.0);

    assert!(
        selection.total_duration() >= 0.90 * target,
        "re-selection must keep filling toward the target: {}",
        selection.total_duration()
    );
    let distinct_selected = selection
        .segments
        .iter()
        .filter(|s| s.segment.start >= 100.0)
        .count();
    assert_eq!(
        distinct_selected, 5,
        "all distinct low scorers belong in the final set"
    );
}

/// A present signal provider switches scoring to the AI-enhanced policy and
/// its scores travel with the selected segments.
#[tokio::test]
async fn signal_provider_scores_attached() {
    struct EagerProvider;

    #[async_trait]
    impl SignalProvider for EagerProvider {
        async fn analyze_segment(&self, _video: &str, start: f64, _end: f64) -> SignalObservation {
            SignalObservation::Measured(ExternalSignal {
                face_score: 0.6,
                emotion_score: if start < 10.0 { 0.9 } else { 0.2 },
                speech_score: 0.5,
                has_faces: true,
                has_speech: true,
            })
        }

        fn name(&self) -> &'static str {
            "eager"
        }
    }

    let opener = static_silent_video(60.0).into_opener();
    let engine =
        HighlightEngine::new(config(10.0)).with_signal_provider(Arc::new(EagerProvider));

    let plan = engine
        .run(&opener, "signal.mp4", &CancellationToken::new())
        .await
        .unwrap();

    assert!(!plan.selection.is_empty());
    for seg in &plan.selection.segments {
        let signal = seg.external.expect("signal should be attached");
        assert!(signal.has_faces);
    }
}

/// A provider that never answers must not stall the pipeline: the per-call
/// budget expires and baseline weighting applies.
#[tokio::test]
async fn hanging_provider_degrades_to_baseline() {
    struct HangingProvider;

    #[async_trait]
    impl SignalProvider for HangingProvider {
        async fn analyze_segment(&self, _video: &str, _start: f64, _end: f64) -> SignalObservation {
            futures::future::pending::<()>().await;
            SignalObservation::Unavailable
        }

        fn name(&self) -> &'static str {
            "hanging"
        }
    }

    let opener = static_silent_video(30.0).into_opener();
    let engine = HighlightEngine::new(config(10.0))
        .with_signal_provider(Arc::new(HangingProvider))
        .with_options(reelcut_engine::EngineOptions {
            signal_budget: std::time::Duration::from_millis(200),
            signal_call_timeout: std::time::Duration::from_millis(50),
            ..reelcut_engine::EngineOptions::default()
        });

    let plan = engine
        .run(&opener, "hang.mp4", &CancellationToken::new())
        .await
        .unwrap();

    for seg in &plan.selection.segments {
        assert!(seg.external.is_none(), "baseline policy applies on timeout");
    }
}

/// Analysis workers each open their own decode handle.
#[tokio::test]
async fn analysis_workers_open_independent_handles() {
    struct CountingOpener {
        inner: SyntheticOpener,
        opens: AtomicUsize,
    }

    #[async_trait]
    impl MediaOpener for CountingOpener {
        async fn open(&self) -> MediaResult<Box<dyn MediaSource>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            self.inner.open().await
        }
    }

    let opener = CountingOpener {
        inner: static_silent_video(60.0).into_opener(),
        opens: AtomicUsize::new(0),
    };

    let engine = HighlightEngine::new(config(10.0));
    engine
        .run(&opener, "counted.mp4", &CancellationToken::new())
        .await
        .unwrap();

    // One handle for the pipeline plus one per analysis worker
    assert!(opener.opens.load(Ordering::SeqCst) > 1);
}

/// An empty selection is a distinct fatal error, not an input error: every
/// window sits below the minimum segment duration.
#[tokio::test]
async fn selection_empty_is_distinct_from_input_error() {
    let video = SyntheticVideo::new(2.0, |_t| pattern_frame(Pattern::Solid(90)))
        .with_pcm(bursty_pcm);
    let opener = video.into_opener();

    let engine = HighlightEngine::new(EngineConfig {
        target_duration: 10.0,
        min_segment_duration: 5.0,
        max_segment_duration: 10.0,
        ..EngineConfig::default()
    });

    let err = engine
        .run(&opener, "tiny.mp4", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_selection_empty());
    assert!(!err.is_unreadable_input());
    assert!(matches!(err, EngineError::SelectionEmpty { .. }));
}
