//! FFmpeg CLI implementation of the media source traits.
//!
//! Every call spawns its own short-lived ffmpeg process and reads the result
//! from stdout, so one `FfmpegSource` value never shares decoder state
//! between calls and opened handles are safe to use from parallel workers.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{MediaError, MediaResult};
use crate::probe::{probe_video, VideoInfo};
use crate::source::{MediaOpener, MediaSource};

/// FFmpeg-backed decode handle for one video file.
pub struct FfmpegSource {
    path: PathBuf,
    info: VideoInfo,
}

impl FfmpegSource {
    /// Open a video file, validating it with ffprobe first.
    pub async fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref().to_path_buf();

        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;
        let info = probe_video(&path).await?;

        debug!(
            path = %path.display(),
            duration = info.duration,
            has_audio = info.has_audio,
            "Opened FFmpeg source"
        );

        Ok(Self { path, info })
    }

    /// Probed video information.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }
}

#[async_trait]
impl MediaSource for FfmpegSource {
    fn duration(&self) -> f64 {
        self.info.duration
    }

    fn has_audio(&self) -> bool {
        self.info.has_audio
    }

    async fn frame_at(&self, timestamp: f64) -> MediaResult<DynamicImage> {
        let output = Command::new("ffmpeg")
            .args([
                "-v",
                "error",
                "-ss",
                &format!("{:.3}", timestamp.max(0.0)),
            ])
            .arg("-i")
            .arg(&self.path)
            .args([
                "-frames:v",
                "1",
                "-f",
                "image2pipe",
                "-vcodec",
                "mjpeg",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(MediaError::ffmpeg_failed(
                format!("frame extraction at {:.3}s produced no data", timestamp),
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        trace!(timestamp, bytes = output.stdout.len(), "Extracted frame");

        image::load_from_memory(&output.stdout)
            .map_err(|e| MediaError::frame_decode(format!("{e}")))
    }

    async fn pcm_in_segment(
        &self,
        start: f64,
        end: f64,
        sample_rate: u32,
    ) -> MediaResult<Vec<f32>> {
        if !self.info.has_audio {
            return Err(MediaError::NoAudioStream);
        }

        let duration = (end - start).max(0.0);
        let output = Command::new("ffmpeg")
            .args([
                "-v",
                "error",
                "-ss",
                &format!("{:.3}", start.max(0.0)),
            ])
            .arg("-i")
            .arg(&self.path)
            .args([
                "-t",
                &format!("{duration:.3}"),
                "-vn",
                "-f",
                "s16le",
                "-acodec",
                "pcm_s16le",
                "-ac",
                "1",
                "-ar",
                &sample_rate.to_string(),
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::ffmpeg_failed(
                format!("PCM extraction for {start:.3}s..{end:.3}s failed"),
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            ));
        }

        trace!(
            start,
            end,
            bytes = output.stdout.len(),
            "Extracted PCM segment"
        );

        Ok(s16le_to_f32(&output.stdout))
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// Opener that hands out independent `FfmpegSource` handles.
#[derive(Debug, Clone)]
pub struct FfmpegOpener {
    path: PathBuf,
}

impl FfmpegOpener {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl MediaOpener for FfmpegOpener {
    async fn open(&self) -> MediaResult<Box<dyn MediaSource>> {
        Ok(Box::new(FfmpegSource::open(&self.path).await?))
    }
}

/// Convert little-endian signed 16-bit PCM bytes to normalized f32 samples.
fn s16le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}
