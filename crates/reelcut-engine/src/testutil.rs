//! Synthetic media sources for unit tests.
//!
//! These generate deterministic frames and PCM in memory so analysis code
//! can be exercised without FFmpeg or fixture files.

use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, Luma};

use reelcut_media::{MediaError, MediaOpener, MediaResult, MediaSource};

type FrameFn = dyn Fn(f64) -> DynamicImage + Send + Sync;
type PcmFn = dyn Fn(f64, f64, u32) -> Vec<f32> + Send + Sync;

/// In-memory media source driven by generator closures.
pub struct SyntheticSource {
    duration: f64,
    has_audio: bool,
    frame_fn: Arc<FrameFn>,
    pcm_fn: Arc<PcmFn>,
}

impl SyntheticSource {
    pub fn new(duration: f64, frame_fn: impl Fn(f64) -> DynamicImage + Send + Sync + 'static) -> Self {
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
}

#[async_trait]
impl MediaSource for SyntheticSource {
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

/// Opener wrapping a shared synthetic source.
pub struct SyntheticOpener(pub Arc<SyntheticSource>);

#[async_trait]
impl MediaOpener for SyntheticOpener {
    async fn open(&self) -> MediaResult<Box<dyn MediaSource>> {
        let src = self.0.clone();
        Ok(Box::new(SharedHandle(src)))
    }
}

struct SharedHandle(Arc<SyntheticSource>);

#[async_trait]
impl MediaSource for SharedHandle {
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

/// Uniform gray frame.
pub fn gray_frame(level: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(320, 240, Luma([level])))
}

/// A static video showing one gray level for its whole duration.
pub fn solid_gray_video(duration: f64, level: u8) -> SyntheticSource {
    SyntheticSource::new(duration, move |_t| gray_frame(level))
}

/// A video of fixed-length scenes cycling through the given gray levels.
pub fn scene_gray_video(duration: f64, scene_len: f64, levels: &[u8]) -> SyntheticSource {
    let levels = levels.to_vec();
    SyntheticSource::new(duration, move |t| {
        let idx = (t / scene_len) as usize % levels.len();
        gray_frame(levels[idx])
    })
}

/// A video with a bright square sweeping over a dark background.
pub fn moving_square_video(duration: f64) -> SyntheticSource {
    SyntheticSource::new(duration, move |t| {
        let mut img = GrayImage::from_pixel(320, 240, Luma([10]));
        let x0 = ((t * 40.0) as u32) % 260;
        for y in 80..160 {
            for x in x0..(x0 + 60).min(320) {
                img.put_pixel(x, y, Luma([245]));
            }
        }
        DynamicImage::ImageLuma8(img)
    })
}

/// Deterministic structural test patterns for similarity checks.
///
/// Patterns differ in coarse structure (not only in color), so both the
/// perceptual-hash and histogram comparators can tell them apart from the
/// black/white splits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TestPattern {
    /// Bright left half
    VSplit,
    /// Bright top half
    HSplit,
    /// Bright right half
    VSplitInv,
    /// Bright bottom half
    HSplitInv,
    /// Bright upper-left and lower-right quadrants
    Checker,
    /// Uniform gray level
    Solid(u8),
}

/// Render a 320x240 frame of the given pattern.
pub fn pattern_frame(pattern: TestPattern) -> DynamicImage {
    let (w, h) = (320u32, 240u32);
    if let TestPattern::Solid(level) = pattern {
        return DynamicImage::ImageLuma8(GrayImage::from_pixel(w, h, Luma([level])));
    }

    let mut img = GrayImage::from_pixel(w, h, Luma([0]));
    for y in 0..h {
        for x in 0..w {
            let bright = match pattern {
                TestPattern::VSplit => x < w / 2,
                TestPattern::HSplit => y < h / 2,
                TestPattern::VSplitInv => x >= w / 2,
                TestPattern::HSplitInv => y >= h / 2,
                TestPattern::Checker => (x < w / 2) == (y < h / 2),
                TestPattern::Solid(_) => unreachable!(),
            };
            if bright {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
    DynamicImage::ImageLuma8(img)
}

/// A video of fixed-length scenes, each showing one pattern.
pub fn pattern_video(scene_len: f64, patterns: Vec<TestPattern>) -> SyntheticSource {
    let duration = scene_len * patterns.len() as f64;
    SyntheticSource::new(duration, move |t| {
        let idx = ((t / scene_len) as usize).min(patterns.len() - 1);
        pattern_frame(patterns[idx])
    })
}

/// Silent PCM for the requested span.
pub fn silent_pcm(start: f64, end: f64, sample_rate: u32) -> Vec<f32> {
    let n = ((end - start).max(0.0) * sample_rate as f64) as usize;
    vec![0.0; n]
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
