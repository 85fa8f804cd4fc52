//! Shared data models for the ReelCut highlight engine.
//!
//! This crate provides Serde-serializable types for:
//! - Candidate time segments and their bounds invariants
//! - Per-segment motion and audio features
//! - Optional external AI signals
//! - Scored segments, selections, and renderer clip windows
//! - Engine configuration and quality presets

pub mod config;
pub mod features;
pub mod plan;
pub mod scored;
pub mod segment;

// Re-export common types
pub use config::{EngineConfig, QualityPreset};
pub use features::{AudioFeatures, AudioSignal, ExternalSignal, MotionFeatures};
pub use plan::HighlightPlan;
pub use scored::{ClipWindow, ScoredSegment, Selection};
pub use segment::{SegmentBoundsError, TimeSegment};
