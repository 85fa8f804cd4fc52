//! Frame similarity backends.
//!
//! The comparator is chosen once at construction. With the `phash` feature
//! (default) a perceptual average hash does the comparison; without it, a
//! per-channel color-histogram correlation stands in.

use image::DynamicImage;

/// Pairwise visual similarity in [0, 1], where 1 means identical.
pub trait FrameComparator: Send + Sync {
    fn compare(&self, a: &DynamicImage, b: &DynamicImage) -> f64;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Perceptual average-hash comparator.
///
/// An 8x8 mean hash gives a 64-bit fingerprint; similarity is
/// `1 - hamming_distance / 64`.
#[cfg(feature = "phash")]
pub struct AverageHashComparator {
    hash_width: u32,
    hash_height: u32,
}

#[cfg(feature = "phash")]
impl AverageHashComparator {
    pub fn new() -> Self {
        Self {
            hash_width: 8,
            hash_height: 8,
        }
    }

    fn hasher(&self) -> image_hasher::Hasher {
        image_hasher::HasherConfig::new()
            .hash_alg(image_hasher::HashAlg::Mean)
            .hash_size(self.hash_width, self.hash_height)
            .to_hasher()
    }
}

#[cfg(feature = "phash")]
impl Default for AverageHashComparator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "phash")]
impl FrameComparator for AverageHashComparator {
    fn compare(&self, a: &DynamicImage, b: &DynamicImage) -> f64 {
        let hasher = self.hasher();
        let hash_a = hasher.hash_image(a);
        let hash_b = hasher.hash_image(b);

        let max_dist = (self.hash_width * self.hash_height) as f64;
        1.0 - hash_a.dist(&hash_b) as f64 / max_dist
    }

    fn name(&self) -> &'static str {
        "average-hash"
    }
}

/// Color-histogram comparator.
///
/// Per-channel 32-bin histograms compared by Pearson correlation, averaged
/// across channels, remapped from [-1, 1] to [0, 1].
pub struct HistogramComparator {
    bins: usize,
}

impl HistogramComparator {
    pub fn new() -> Self {
        Self { bins: 32 }
    }

    fn channel_histograms(&self, img: &DynamicImage) -> [Vec<f64>; 3] {
        let rgb = img.to_rgb8();
        let mut hists = [
            vec![0.0; self.bins],
            vec![0.0; self.bins],
            vec![0.0; self.bins],
        ];

        let bin_width = 256.0 / self.bins as f64;
        for pixel in rgb.pixels() {
            for channel in 0..3 {
                let bin = ((pixel.0[channel] as f64 / bin_width) as usize).min(self.bins - 1);
                hists[channel][bin] += 1.0;
            }
        }

        hists
    }
}

impl Default for HistogramComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameComparator for HistogramComparator {
    fn compare(&self, a: &DynamicImage, b: &DynamicImage) -> f64 {
        let hists_a = self.channel_histograms(a);
        let hists_b = self.channel_histograms(b);

        let mean_correlation = hists_a
            .iter()
            .zip(hists_b.iter())
            .map(|(ha, hb)| pearson(ha, hb))
            .sum::<f64>()
            / 3.0;

        // Correlation ranges over [-1, 1]
        (mean_correlation + 1.0) / 2.0
    }

    fn name(&self) -> &'static str {
        "histogram"
    }
}

/// Pearson correlation of two equal-length vectors.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len()) as f64;
    if n == 0.0 {
        return 0.0;
    }

    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        // Degenerate flat histograms: identical inputs are a perfect match
        if a == b {
            1.0
        } else {
            0.0
        }
    } else {
        cov / denom
    }
}

/// The comparator picked for this build: perceptual hashing when compiled
/// in, histogram correlation otherwise.
pub fn default_comparator() -> Box<dyn FrameComparator> {
    #[cfg(feature = "phash")]
    {
        Box::new(AverageHashComparator::new())
    }
    #[cfg(not(feature = "phash"))]
    {
        Box::new(HistogramComparator::new())
    }
}
