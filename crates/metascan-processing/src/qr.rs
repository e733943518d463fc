//! Visual barcode detection

use std::sync::Arc;

use image::{DynamicImage, GrayImage};
use metascan_core::{QrCodes, RiskCategory, RiskFinding};

use crate::error::DetectorError;

/// Longest side the decoder is given; larger images are downscaled first.
const MAX_SCAN_DIMENSION: u32 = 2048;

/// Decodes every QR code visible in a greyscale raster.
pub trait QrDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool {
        true
    }

    /// Returns one entry per detected code; `None` for codes that were found but
    /// could not be decoded.
    fn decode(&self, image: &GrayImage) -> Result<Vec<Option<String>>, DetectorError>;
}

/// QR decoding backed by `rqrr`.
#[cfg(feature = "qr")]
pub struct RqrrDecoder;

#[cfg(feature = "qr")]
impl QrDecoder for RqrrDecoder {
    fn name(&self) -> &'static str {
        "rqrr"
    }

    fn decode(&self, image: &GrayImage) -> Result<Vec<Option<String>>, DetectorError> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            image.width() as usize,
            image.height() as usize,
            |x, y| image.get_pixel(x as u32, y as u32)[0],
        );

        let payloads = prepared
            .detect_grids()
            .iter()
            .map(|grid| match grid.decode() {
                Ok((_meta, content)) => Some(content),
                Err(e) => {
                    tracing::debug!(error = ?e, "QR grid detected but not decodable");
                    None
                }
            })
            .collect();

        Ok(payloads)
    }
}

/// Stand-in used when no QR backend is compiled in. Never finds anything.
pub struct UnavailableQrDecoder;

impl QrDecoder for UnavailableQrDecoder {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn decode(&self, _image: &GrayImage) -> Result<Vec<Option<String>>, DetectorError> {
        Ok(Vec::new())
    }
}

pub fn default_qr_decoder() -> Arc<dyn QrDecoder> {
    #[cfg(feature = "qr")]
    {
        Arc::new(RqrrDecoder)
    }
    #[cfg(not(feature = "qr"))]
    {
        Arc::new(UnavailableQrDecoder)
    }
}

#[derive(Clone)]
pub struct QrScanner {
    decoder: Arc<dyn QrDecoder>,
}

impl QrScanner {
    pub fn new(decoder: Arc<dyn QrDecoder>) -> Self {
        Self { decoder }
    }

    pub fn scan(&self, image: &DynamicImage) -> Result<QrCodes, DetectorError> {
        if !self.decoder.is_available() {
            return Ok(QrCodes::none());
        }

        let luma = if image.width().max(image.height()) > MAX_SCAN_DIMENSION {
            image
                .resize(
                    MAX_SCAN_DIMENSION,
                    MAX_SCAN_DIMENSION,
                    image::imageops::FilterType::Triangle,
                )
                .to_luma8()
        } else {
            image.to_luma8()
        };

        let payloads = self.decoder.decode(&luma)?;

        Ok(QrCodes {
            found: !payloads.is_empty(),
            count: payloads.len(),
            data: payloads.into_iter().flatten().next(),
        })
    }
}

pub fn qr_findings(qr: &QrCodes) -> Vec<RiskFinding> {
    if qr.found {
        vec![RiskFinding::new(RiskCategory::QrCode)]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeDecoder(Vec<Option<String>>);

    impl QrDecoder for FakeDecoder {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn decode(&self, _image: &GrayImage) -> Result<Vec<Option<String>>, DetectorError> {
            Ok(self.0.clone())
        }
    }

    struct FailingDecoder;

    impl QrDecoder for FailingDecoder {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn decode(&self, _image: &GrayImage) -> Result<Vec<Option<String>>, DetectorError> {
            Err(DetectorError::Qr("corrupt finder pattern".to_string()))
        }
    }

    fn blank() -> DynamicImage {
        DynamicImage::new_luma8(32, 32)
    }

    #[test]
    fn test_multiple_codes_report_count_and_first_payload() {
        let scanner = QrScanner::new(Arc::new(FakeDecoder(vec![
            None,
            Some("https://example.com/a".to_string()),
            Some("https://example.com/b".to_string()),
        ])));

        let result = scanner.scan(&blank()).unwrap();
        assert!(result.found);
        assert_eq!(result.count, 3);
        assert_eq!(result.data.as_deref(), Some("https://example.com/a"));
        assert_eq!(
            qr_findings(&result),
            vec![RiskFinding::new(RiskCategory::QrCode)]
        );
    }

    #[test]
    fn test_no_codes_is_not_an_error() {
        let scanner = QrScanner::new(Arc::new(FakeDecoder(Vec::new())));
        let result = scanner.scan(&blank()).unwrap();
        assert_eq!(result, QrCodes::none());
        assert!(qr_findings(&result).is_empty());
    }

    #[test]
    fn test_unavailable_decoder_degrades_to_not_found() {
        let scanner = QrScanner::new(Arc::new(UnavailableQrDecoder));
        assert_eq!(scanner.scan(&blank()).unwrap(), QrCodes::none());
    }

    #[test]
    fn test_decoder_failure_is_detector_error() {
        let scanner = QrScanner::new(Arc::new(FailingDecoder));
        assert!(matches!(
            scanner.scan(&blank()),
            Err(DetectorError::Qr(_))
        ));
    }

    #[cfg(feature = "qr")]
    #[test]
    fn test_rqrr_finds_nothing_in_gradient() {
        let image = image::load_from_memory(&crate::test_support::png_image(64, 64)).unwrap();
        let scanner = QrScanner::new(Arc::new(RqrrDecoder));
        assert!(!scanner.scan(&image).unwrap().found);
    }
}
