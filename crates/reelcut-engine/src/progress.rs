//! Coarse progress reporting.
//!
//! Milestones are observability only and never part of correctness; the
//! embedding job layer decides where they go (WebSocket, queue, logs).

use tracing::info;

use crate::error::Stage;

/// Sink for coarse percentage milestones.
pub trait ProgressSink: Send + Sync {
    /// A pipeline stage is starting.
    fn stage(&self, stage: Stage, percent: u8);

    /// Free-form progress note.
    fn log(&self, message: &str) {
        let _ = message;
    }
}

/// Sink that drops everything.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn stage(&self, _stage: Stage, _percent: u8) {}
}

/// Sink that reports through `tracing`.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn stage(&self, stage: Stage, percent: u8) {
        info!(stage = %stage, percent, "Pipeline progress");
    }

    fn log(&self, message: &str) {
        info!("{message}");
    }
}
