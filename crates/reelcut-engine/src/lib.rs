//! Highlight selection engine.
//!
//! Given a decode collaborator handle onto a raw video, the engine finds the
//! most interesting moments and assembles a chronological highlight plan
//! within a target duration:
//!
//! ```text
//! Init → Segment → Analyze → Score → SelectInitial
//!      → DiversityPenalize → RescoreSort → SelectFinal → Done
//! ```
//!
//! The engine never decodes or re-encodes media itself; it consumes the
//! `reelcut-media` source traits and hands the final `{start, end}` list to
//! an external renderer.

pub mod audio;
pub mod diversity;
pub mod error;
pub mod motion;
pub mod orchestrator;
pub mod progress;
pub mod scorer;
pub mod segmenter;
pub mod selector;

#[cfg(test)]
pub(crate) mod testutil;

pub use audio::{AudioConfig, AudioSignalAnalyzer, ExcitementTuning};
pub use diversity::{
    default_comparator, DiversityConfig, DiversityScorer, FrameComparator, HistogramComparator,
};
pub use error::{EngineError, EngineResult, Stage};
pub use motion::{MotionAnalyzer, MotionConfig};
pub use orchestrator::{EngineOptions, HighlightEngine};
pub use progress::{NoopProgress, ProgressSink, TracingProgress};
pub use scorer::{BaselineWeights, EnhancedWeights, Scorer, ScoringConfig};
pub use segmenter::{SceneSegmenter, SegmenterConfig};
pub use selector::{Selector, SelectorConfig};

#[cfg(feature = "phash")]
pub use diversity::AverageHashComparator;
