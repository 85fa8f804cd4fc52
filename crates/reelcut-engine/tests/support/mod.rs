//! Synthetic media sources shared by the integration tests.
//!
//! Frames and PCM are generated deterministically in memory, so the full
//! pipeline runs without FFmpeg or fixture files.

use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, Luma};

use reelcut_media::{MediaError, MediaOpener, MediaResult, MediaSource};

type FrameFn = dyn Fn(f64) -> DynamicImage + Send + Sync;
type PcmFn = dyn Fn(f64, f64, u32) -> Vec<f32> + Send + Sync;

/// In-memory media source driven by generator closures.
pub struct SyntheticVideo {
    duration: f64,
    has_audio: bool,
    frame_fn: Arc<FrameFn>,
    pcm_fn: Arc<PcmFn>,
}

impl SyntheticVideo {
    pub fn new(
        duration: f64,
        frame_fn: impl Fn(f64) -> DynamicImage + Send + Sync + 'static,
    ) -> Self {
        Self {
            duration,
            has_audio: false,
            frame_fn: Arc::new(frame_fn),
            pcm_fn: Arc::new(|_, _, _| Vec::new()),
        }
    }

    pub fn with_pcm(
        mut self,
        pcm_fn: impl Fn(f64, f64, u32) -> Vec<f32> + Send + Sync + 'static,
    ) -> Self {
        self.has_audio = true;
        self.pcm_fn = Arc::new(pcm_fn);
        self
    }

    pub fn into_opener(self) -> SyntheticOpener {
        SyntheticOpener(Arc::new(self))
    }
}

#[async_trait]
impl MediaSource for SyntheticVideo {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn has_audio(&self) -> bool {
        self.has_audio
    }

    async fn frame_at(&self, timestamp: f64) -> MediaResult<DynamicImage> {
        if timestamp < 0.0 || timestamp > self.duration {
            return Err(MediaError::internal(format!(
                "timestamp {timestamp} out of range"
            )));
        }
        Ok((self.frame_fn)(timestamp))
    }

    async fn pcm_in_segment(
        &self,
        start: f64,
        end: f64,
        sample_rate: u32,
    ) -> MediaResult<Vec<f32>> {
        if !self.has_audio {
            return Err(MediaError::NoAudioStream);
        }
        Ok((self.pcm_fn)(start, end, sample_rate))
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

/// Opener handing out independent handles onto one shared synthetic video.
pub struct SyntheticOpener(pub Arc<SyntheticVideo>);

struct Handle(Arc<SyntheticVideo>);

#[async_trait]
impl MediaSource for Handle {
    fn duration(&self) -> f64 {
        self.0.duration()
    }

    fn has_audio(&self) -> bool {
        self.0.has_audio()
    }

    async fn frame_at(&self, timestamp: f64) -> MediaResult<DynamicImage> {
        self.0.frame_at(timestamp).await
    }

    async fn pcm_in_segment(
        &self,
        start: f64,
        end: f64,
        sample_rate: u32,
    ) -> MediaResult<Vec<f32>> {
        self.0.pcm_in_segment(start, end, sample_rate).await
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

#[async_trait]
impl MediaOpener for SyntheticOpener {
    async fn open(&self) -> MediaResult<Box<dyn MediaSource>> {
        Ok(Box::new(Handle(self.0.clone())))
    }
}

/// Structural frame patterns. Orthogonal splits read as distinct to the
/// perceptual-hash comparator; solids differ from splits under both
/// comparator backends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    VSplit,
    HSplit,
    VSplitInv,
    HSplitInv,
    Checker,
    Solid(u8),
}

/// Render a 320x240 frame of the given pattern.
pub fn pattern_frame(pattern: Pattern) -> DynamicImage {
    let (w, h) = (320u32, 240u32);
    if let Pattern::Solid(level) = pattern {
        return DynamicImage::ImageLuma8(GrayImage::from_pixel(w, h, Luma([level])));
    }

    let mut img = GrayImage::from_pixel(w, h, Luma([0]));
    for y in 0..h {
        for x in 0..w {
            let bright = match pattern {
                Pattern::VSplit => x < w / 2,
                Pattern::HSplit => y < h / 2,
                Pattern::VSplitInv => x >= w / 2,
                Pattern::HSplitInv => y >= h / 2,
                Pattern::Checker => (x < w / 2) == (y < h / 2),
                Pattern::Solid(_) => unreachable!(),
            };
            if bright {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
    DynamicImage::ImageLuma8(img)
}

/// A video of fixed-length scenes, each showing one pattern.
pub fn pattern_video(scene_len: f64, patterns: Vec<Pattern>) -> SyntheticVideo {
    let duration = scene_len * patterns.len() as f64;
    SyntheticVideo::new(duration, move |t| {
        let idx = ((t / scene_len) as usize).min(patterns.len() - 1);
        pattern_frame(patterns[idx])
    })
}

/// A static, silent video: one gray level, zeroed PCM.
pub fn static_silent_video(duration: f64) -> SyntheticVideo {
    SyntheticVideo::new(duration, |_t| pattern_frame(Pattern::Solid(110))).with_pcm(
        |start, end, rate| {
            let n = ((end - start).max(0.0) * rate as f64) as usize;
            vec![0.0; n]
        },
    )
}

/// PCM alternating loud sine bursts and near-silence every half second.
pub fn bursty_pcm(start: f64, end: f64, sample_rate: u32) -> Vec<f32> {
    let n = ((end - start).max(0.0) * sample_rate as f64) as usize;
    (0..n)
        .map(|i| {
            let t = start + i as f64 / sample_rate as f64;
            let loud = (t * 2.0) as u64 % 2 == 0;
            let amp = if loud { 0.8 } else { 0.002 };
            (amp * (2.0 * std::f64::consts::PI * 440.0 * t).sin()) as f32
        })
        .collect()
}
