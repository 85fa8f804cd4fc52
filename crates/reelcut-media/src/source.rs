//! Media source traits the engine analyzes through.

use async_trait::async_trait;
use image::DynamicImage;

use crate::error::MediaResult;

/// A readable handle onto one video.
///
/// Implementations must be safe to call from a single worker at a time; they
/// are not required to support concurrent seeks on one handle. Workers that
/// analyze in parallel obtain their own handles from a [`MediaOpener`].
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Total duration in seconds.
    fn duration(&self) -> f64;

    /// Whether the source carries an audio stream.
    fn has_audio(&self) -> bool;

    /// Decode the frame nearest to `timestamp` seconds.
    async fn frame_at(&self, timestamp: f64) -> MediaResult<DynamicImage>;

    /// Extract mono PCM samples in `[-1, 1]` for `[start, end)` at the
    /// given sample rate.
    async fn pcm_in_segment(
        &self,
        start: f64,
        end: f64,
        sample_rate: u32,
    ) -> MediaResult<Vec<f32>>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str {
        "media-source"
    }
}

/// Opens fresh decode handles onto one video.
///
/// Containers are not safely seekable concurrently from a single handle, so
/// each analysis worker opens its own source through this trait.
#[async_trait]
pub trait MediaOpener: Send + Sync {
    /// Open a new handle. Fails with an "unreadable input" class error for
    /// corrupt or zero-duration inputs.
    async fn open(&self) -> MediaResult<Box<dyn MediaSource>>;
}
