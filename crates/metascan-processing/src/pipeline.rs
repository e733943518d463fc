//! Analysis pipeline composing every detector into one report

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use image::DynamicImage;
use metascan_core::constants::GEOCODER_TIMEOUT_SECS;
use metascan_core::{
    AnalysisReport, Config, ExifData, FileInfo, RiskCategory, RiskFinding, Section,
};

use crate::capabilities::Capabilities;
use crate::error::DetectorError;
use crate::exif::{analyze_exif, exif_findings, metadata_text};
use crate::hashes::compute_hashes;
use crate::magic::{detect_format, validate_magic_bytes};
use crate::qr::{qr_findings, QrScanner};
use crate::score::{aggregate, ScoreWeights};
use crate::script::{script_findings, ScriptInjectionScanner};
use crate::stego::{stego_findings, SteganographyAnalyzer};
use crate::validator::file_extension;

/// One uploaded file. Shared read-only by every detector.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub bytes: Bytes,
    pub filename: String,
    pub content_type: String,
}

impl SourceFile {
    pub fn new(
        bytes: impl Into<Bytes>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Run `f` on the blocking pool; a panic becomes an `Aborted` error for
/// `detector` alone.
async fn run_blocking<T, F>(detector: &'static str, f: F) -> Result<T, DetectorError>
where
    F: FnOnce() -> Result<T, DetectorError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) => Err(DetectorError::Aborted {
            detector,
            message: e.to_string(),
        }),
    }
}

fn into_section<T>(detector: &'static str, result: Result<T, DetectorError>) -> Section<T> {
    if let Err(e) = &result {
        tracing::warn!(detector, error = %e, "Detector failed");
    }
    result.into()
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    capabilities: Capabilities,
    qr_scanner: QrScanner,
    stego_analyzer: SteganographyAnalyzer,
    script_scanner: Arc<ScriptInjectionScanner>,
    weights: ScoreWeights,
}

impl AnalysisPipeline {
    pub fn new(config: &Config, capabilities: Capabilities) -> anyhow::Result<Self> {
        let script_scanner = ScriptInjectionScanner::new(config.script_scan_window_bytes())?;

        Ok(Self {
            qr_scanner: QrScanner::new(capabilities.qr_decoder.clone()),
            stego_analyzer: SteganographyAnalyzer::new(capabilities.lsb_sampler.clone()),
            script_scanner: Arc::new(script_scanner),
            capabilities,
            weights: ScoreWeights::default(),
        })
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Decode once, then run the pixel detectors side by side.
    async fn analyze_pixels(
        &self,
        bytes: Bytes,
    ) -> (
        Result<metascan_core::QrCodes, DetectorError>,
        Result<metascan_core::Steganography, DetectorError>,
    ) {
        let decode_bytes = bytes.clone();
        let decoded = run_blocking("pixels", move || {
            image::load_from_memory(&decode_bytes)
                .map(Arc::new)
                .map_err(|e| DetectorError::Decode(e.to_string()))
        })
        .await;

        let image: Arc<DynamicImage> = match decoded {
            Ok(image) => image,
            Err(e) => {
                let message = match e {
                    DetectorError::Decode(message) => message,
                    other => other.to_string(),
                };
                return (
                    Err(DetectorError::Decode(message.clone())),
                    Err(DetectorError::Decode(message)),
                );
            }
        };

        let qr_image = image.clone();
        let qr_scanner = self.qr_scanner.clone();
        let stego_analyzer = self.stego_analyzer.clone();

        tokio::join!(
            run_blocking("qr_codes", move || qr_scanner.scan(&qr_image)),
            run_blocking("steganography", move || {
                let format = detect_format(&bytes);
                Ok(stego_analyzer.analyze(&bytes, &image, format))
            }),
        )
    }

    /// Attach a place name to resolved coordinates when a geocoder is live.
    /// Lookup failures only drop the place name.
    async fn geocode(&self, exif: &mut ExifData) {
        if !self.capabilities.geocoder.is_available() {
            return;
        }
        let Some(Section::Ready(coords)) = exif.gps_data.as_mut() else {
            return;
        };

        let lookup = self
            .capabilities
            .geocoder
            .reverse(coords.latitude, coords.longitude);
        match tokio::time::timeout(Duration::from_secs(GEOCODER_TIMEOUT_SECS), lookup).await {
            Ok(Ok(location)) => coords.location = location,
            Ok(Err(e)) => tracing::warn!(error = %e, "Reverse geocoding failed"),
            Err(_) => tracing::warn!("Reverse geocoding timed out"),
        }
    }

    #[tracing::instrument(skip(self, source), fields(filename = %source.filename, size = source.size()))]
    pub async fn analyze(&self, source: SourceFile) -> AnalysisReport {
        let started = std::time::Instant::now();

        let file_info = FileInfo {
            name: source.filename.clone(),
            size: source.size() as u64,
            modified: Utc::now(),
            extension: file_extension(&source.filename)
                .map(|ext| format!(".{}", ext))
                .unwrap_or_default(),
        };

        let hash_bytes = source.bytes.clone();
        let magic_bytes = source.bytes.clone();
        let magic_filename = source.filename.clone();
        let exif_bytes = source.bytes.clone();

        let (hashes, magic, mut exif, (qr, stego)) = tokio::join!(
            run_blocking("hashes", move || Ok(compute_hashes(&hash_bytes))),
            run_blocking("magic_bytes", move || {
                Ok(validate_magic_bytes(&magic_bytes, &magic_filename))
            }),
            run_blocking("exif_data", move || analyze_exif(&exif_bytes)),
            self.analyze_pixels(source.bytes.clone()),
        );

        if let Ok(exif_data) = exif.as_mut() {
            self.geocode(exif_data).await;
        }

        let text = exif
            .as_ref()
            .map(|e| metadata_text(&e.metadata))
            .unwrap_or_default();
        let script_scanner = self.script_scanner.clone();
        let script_bytes = source.bytes.clone();
        let script = run_blocking("script_injection", move || {
            Ok(script_scanner.scan(&script_bytes, &text))
        })
        .await;

        let hashes = into_section("hashes", hashes);
        let magic_bytes = into_section("magic_bytes", magic);
        let exif_data = into_section("exif_data", exif);
        let qr_codes = into_section("qr_codes", qr);
        let steganography = into_section("steganography", stego);
        let script_injection = into_section("script_injection", script);

        let mut findings: Vec<RiskFinding> = Vec::new();
        if magic_bytes.ready().is_some_and(|m| !m.is_valid) {
            findings.push(RiskFinding::new(RiskCategory::FormatMismatch));
        }
        if let Some(exif) = exif_data.ready() {
            findings.extend(exif_findings(exif));
        }
        if let Some(qr) = qr_codes.ready() {
            findings.extend(qr_findings(qr));
        }
        if let Some(stego) = steganography.ready() {
            findings.extend(stego_findings(stego));
        }
        if let Some(script) = script_injection.ready() {
            findings.extend(script_findings(script));
        }

        let score = aggregate(&findings, &self.weights);

        tracing::info!(
            privacy_score = score.privacy_score,
            risk_count = findings.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Analysis completed"
        );

        AnalysisReport {
            privacy_score: score.privacy_score,
            risks: score.risks,
            file_info: Section::Ready(file_info),
            exif_data,
            qr_codes,
            steganography,
            script_injection,
            magic_bytes,
            hashes,
        }
    }
}
