//! Signal provider trait.

use async_trait::async_trait;
use reelcut_models::ExternalSignal;

/// Outcome of asking the provider about one segment.
///
/// There is deliberately no error arm: the engine never fails a pipeline run
/// because the signal provider is down. Transport failures, timeouts, and
/// malformed responses all collapse to `Unavailable`.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalObservation {
    Measured(ExternalSignal),
    Unavailable,
}

impl SignalObservation {
    pub fn into_option(self) -> Option<ExternalSignal> {
        match self {
            SignalObservation::Measured(s) => Some(s),
            SignalObservation::Unavailable => None,
        }
    }
}

/// A provider of per-segment AI scores.
///
/// Held by the orchestrator for its lifetime and passed by reference into
/// each per-segment call; implementations must be shareable across segments.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// Analyze one segment of the given video.
    async fn analyze_segment(&self, video: &str, start: f64, end: f64) -> SignalObservation;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}
