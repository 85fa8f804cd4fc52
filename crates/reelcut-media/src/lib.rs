//! Decode collaborator boundary for the ReelCut engine.
//!
//! This crate provides:
//! - The `MediaSource` / `MediaOpener` traits the engine analyzes through
//! - An FFmpeg CLI implementation (ffprobe probing, single-frame extraction,
//!   mono PCM extraction)
//! - Small frame helpers (luma downscale, mean absolute difference)
//!
//! The engine never decodes media itself; everything it knows about a video
//! arrives through these traits.

pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod probe;
pub mod source;

pub use error::{MediaError, MediaResult};
pub use ffmpeg::{FfmpegOpener, FfmpegSource};
pub use frame::{downscale_luma, mean_abs_diff};
pub use probe::{probe_video, VideoInfo};
pub use source::{MediaOpener, MediaSource};
