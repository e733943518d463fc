//! Statistical hidden-data heuristics
//!
//! Two signals: the encoded file size against the size of the same raster
//! stored uncompressed, and how close the least-significant bits of the pixel
//! channels are to a fair coin.

use std::sync::Arc;

use image::DynamicImage;
use metascan_core::{RiskCategory, RiskFinding, Steganography};

use crate::magic::ImageFormat;

/// File size over raw bitmap size above which appended data is suspected.
pub const SIZE_RATIO_THRESHOLD: f64 = 5.0;

/// The ratio is only meaningful once the raw bitmap is this large; tiny
/// images are dominated by container overhead.
const MIN_RAW_BYTES_FOR_RATIO: u64 = 1024;

/// LSB variance at or above which the low bit plane looks like random data.
/// The theoretical maximum is 0.25.
pub const LSB_VARIANCE_THRESHOLD: f64 = 0.2499;

/// Fewer samples than this give too noisy an estimate to act on.
const MIN_LSB_SAMPLES: usize = 4096;

const MAX_LSB_SAMPLES: usize = 65536;

/// Samples least-significant bits from the pixel channels of an image.
pub trait LsbSampler: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    /// Returns `(variance, sample_count)` of the sampled LSBs.
    fn lsb_variance(&self, image: &DynamicImage) -> Option<(f64, usize)>;
}

/// Samples the colour channels (alpha excluded) on an even stride.
#[cfg(feature = "steganography")]
pub struct ChannelLsbSampler {
    max_samples: usize,
}

#[cfg(feature = "steganography")]
impl Default for ChannelLsbSampler {
    fn default() -> Self {
        Self {
            max_samples: MAX_LSB_SAMPLES,
        }
    }
}

#[cfg(feature = "steganography")]
impl LsbSampler for ChannelLsbSampler {
    fn lsb_variance(&self, image: &DynamicImage) -> Option<(f64, usize)> {
        let rgb = image.to_rgb8();
        let channels = rgb.as_raw();
        if channels.is_empty() {
            return None;
        }

        let stride = (channels.len() / self.max_samples).max(1);
        let (ones, count) = channels
            .iter()
            .step_by(stride)
            .take(self.max_samples)
            .fold((0usize, 0usize), |(ones, count), v| {
                (ones + (v & 1) as usize, count + 1)
            });

        let p = ones as f64 / count as f64;
        Some((p * (1.0 - p), count))
    }
}

/// Stand-in used when no sampler is compiled in.
pub struct UnavailableLsbSampler;

impl LsbSampler for UnavailableLsbSampler {
    fn is_available(&self) -> bool {
        false
    }

    fn lsb_variance(&self, _image: &DynamicImage) -> Option<(f64, usize)> {
        None
    }
}

pub fn default_lsb_sampler() -> Arc<dyn LsbSampler> {
    #[cfg(feature = "steganography")]
    {
        Arc::new(ChannelLsbSampler::default())
    }
    #[cfg(not(feature = "steganography"))]
    {
        Arc::new(UnavailableLsbSampler)
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Clone)]
pub struct SteganographyAnalyzer {
    sampler: Arc<dyn LsbSampler>,
}

impl SteganographyAnalyzer {
    pub fn new(sampler: Arc<dyn LsbSampler>) -> Self {
        Self { sampler }
    }

    /// `format` is the detected container; LSBs of lossy formats are not
    /// used as a signal because decoding does not preserve them.
    pub fn analyze(
        &self,
        data: &[u8],
        image: &DynamicImage,
        format: Option<ImageFormat>,
    ) -> Steganography {
        if !self.sampler.is_available() {
            return Steganography {
                suspicious: false,
                size_ratio: 0.0,
                lsb_variance: 0.0,
                analysis: "LSB statistics unavailable in this build; steganography check skipped"
                    .to_string(),
            };
        }

        let raw_size = image.width() as u64
            * image.height() as u64
            * image.color().bytes_per_pixel() as u64;
        let size_ratio = if raw_size == 0 {
            0.0
        } else {
            data.len() as f64 / raw_size as f64
        };
        let ratio_suspicious = raw_size >= MIN_RAW_BYTES_FOR_RATIO && size_ratio > SIZE_RATIO_THRESHOLD;

        let (lsb_variance, samples) = self.sampler.lsb_variance(image).unwrap_or((0.0, 0));
        let lossy = matches!(format, Some(ImageFormat::Jpeg));
        let lsb_suspicious =
            !lossy && samples >= MIN_LSB_SAMPLES && lsb_variance >= LSB_VARIANCE_THRESHOLD;

        let mut reasons = Vec::new();
        if ratio_suspicious {
            reasons.push(format!(
                "file is {:.1}x larger than its uncompressed bitmap, suggesting appended data",
                size_ratio
            ));
        }
        if lsb_suspicious {
            reasons.push(
                "least-significant bits are distributed like random data, typical of LSB embedding"
                    .to_string(),
            );
        }

        let analysis = if reasons.is_empty() {
            "No statistical anomalies detected".to_string()
        } else {
            let mut text = reasons.join("; ");
            if let Some(first) = text.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            text
        };

        Steganography {
            suspicious: ratio_suspicious || lsb_suspicious,
            size_ratio: round_to(size_ratio, 3),
            lsb_variance: round_to(lsb_variance, 6),
            analysis,
        }
    }
}

pub fn stego_findings(result: &Steganography) -> Vec<RiskFinding> {
    if result.suspicious {
        vec![RiskFinding::new(RiskCategory::Steganography)]
    } else {
        Vec::new()
    }
}

#[cfg(all(test, feature = "steganography"))]
mod tests {
    use super::*;
    use crate::test_support::png_image;
    use image::{Rgb, RgbImage};

    fn analyzer() -> SteganographyAnalyzer {
        SteganographyAnalyzer::new(Arc::new(ChannelLsbSampler::default()))
    }

    /// Smooth image whose low bits are then overwritten with pseudo-random data.
    fn lsb_embedded(width: u32, height: u32) -> DynamicImage {
        let mut state: u32 = 0x1234_5678;
        let img = RgbImage::from_fn(width, height, |x, y| {
            let mut px = [(x % 256) as u8 & 0xFE, (y % 256) as u8 & 0xFE, 128];
            for channel in px.iter_mut() {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                *channel |= ((state >> 24) & 1) as u8;
            }
            Rgb(px)
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_natural_gradient_is_not_suspicious() {
        let data = png_image(64, 64);
        let image = image::load_from_memory(&data).unwrap();
        let result = analyzer().analyze(&data, &image, Some(ImageFormat::Png));

        assert!(!result.suspicious);
        assert!(result.size_ratio < SIZE_RATIO_THRESHOLD);
        assert!(result.lsb_variance < LSB_VARIANCE_THRESHOLD);
        assert_eq!(result.analysis, "No statistical anomalies detected");
        assert!(stego_findings(&result).is_empty());
    }

    #[test]
    fn test_appended_payload_trips_size_ratio() {
        let mut data = png_image(32, 32);
        let image = image::load_from_memory(&data).unwrap();
        data.extend(std::iter::repeat(0xAB).take(64 * 1024));

        let result = analyzer().analyze(&data, &image, Some(ImageFormat::Png));
        assert!(result.suspicious);
        assert!(result.size_ratio > SIZE_RATIO_THRESHOLD);
        assert!(result.analysis.contains("appended data"));
        assert_eq!(
            stego_findings(&result),
            vec![RiskFinding::new(RiskCategory::Steganography)]
        );
    }

    #[test]
    fn test_random_low_bits_trip_lsb_variance() {
        let image = lsb_embedded(128, 128);
        let result = analyzer().analyze(&[0u8; 100], &image, Some(ImageFormat::Png));

        assert!(result.lsb_variance >= LSB_VARIANCE_THRESHOLD);
        assert!(result.suspicious);
        assert!(result.analysis.contains("random data"));
    }

    #[test]
    fn test_lossy_formats_ignore_lsb_signal() {
        let image = lsb_embedded(128, 128);
        let result = analyzer().analyze(&[0u8; 100], &image, Some(ImageFormat::Jpeg));
        assert!(!result.suspicious);
    }

    #[test]
    fn test_unavailable_sampler_degrades() {
        let analyzer = SteganographyAnalyzer::new(Arc::new(UnavailableLsbSampler));
        let image = lsb_embedded(16, 16);
        let result = analyzer.analyze(&[0u8; 10_000_000], &image, Some(ImageFormat::Png));
        assert!(!result.suspicious);
        assert!(result.analysis.contains("unavailable"));
    }

    #[test]
    fn test_tiny_images_skip_ratio_check() {
        let data = png_image(2, 2);
        let image = image::load_from_memory(&data).unwrap();
        let result = analyzer().analyze(&data, &image, Some(ImageFormat::Png));
        assert!(result.size_ratio > SIZE_RATIO_THRESHOLD);
        assert!(!result.suspicious);
    }
}
