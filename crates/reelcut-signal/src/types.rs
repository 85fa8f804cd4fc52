//! Signal provider request/response types.

use reelcut_models::ExternalSignal;
use serde::{Deserialize, Serialize};

/// Request for per-segment AI analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAnalysisRequest {
    /// Locator for the source video (path or URL the provider can reach)
    pub video: String,
    /// Segment start in seconds
    pub start: f64,
    /// Segment end in seconds
    pub end: f64,
}

/// Per-segment scores returned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAnalysisResponse {
    pub face_score: f64,
    pub emotion_score: f64,
    pub speech_score: f64,
    #[serde(default)]
    pub has_faces: bool,
    #[serde(default)]
    pub has_speech: bool,
}

impl From<SegmentAnalysisResponse> for ExternalSignal {
    fn from(resp: SegmentAnalysisResponse) -> Self {
        ExternalSignal {
            face_score: resp.face_score.clamp(0.0, 1.0),
            emotion_score: resp.emotion_score.clamp(0.0, 1.0),
            speech_score: resp.speech_score.clamp(0.0, 1.0),
            has_faces: resp.has_faces,
            has_speech: resp.has_speech,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}
