//! Client for the external AI signal provider.
//!
//! The provider runs out of process (face detection, emotion recognition,
//! speech scoring) and is strictly optional: every failure mode at this
//! boundary degrades to [`SignalObservation::Unavailable`], and the engine
//! falls back to its baseline weighting policy.

pub mod client;
pub mod error;
pub mod provider;
pub mod types;

pub use client::{SignalClient, SignalClientConfig};
pub use error::{SignalError, SignalResult};
pub use provider::{SignalObservation, SignalProvider};
pub use types::{HealthResponse, SegmentAnalysisRequest, SegmentAnalysisResponse};
