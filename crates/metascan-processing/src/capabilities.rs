//! Optional analysis capabilities selected at build and startup time

use std::sync::Arc;

use serde::Serialize;

use crate::geocode::{geocoder_from_config, Geocoder, NoopGeocoder};
use crate::qr::{default_qr_decoder, QrDecoder};
use crate::stego::{default_lsb_sampler, LsbSampler};

/// Which capabilities are live in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityReport {
    pub qr: bool,
    pub steganography: bool,
    pub geocoding: bool,
    pub metadata_removal: bool,
}

#[derive(Clone)]
pub struct Capabilities {
    pub qr_decoder: Arc<dyn QrDecoder>,
    pub lsb_sampler: Arc<dyn LsbSampler>,
    pub geocoder: Arc<dyn Geocoder>,
}

impl Default for Capabilities {
    /// Compiled-in defaults with geocoding off.
    fn default() -> Self {
        Self {
            qr_decoder: default_qr_decoder(),
            lsb_sampler: default_lsb_sampler(),
            geocoder: Arc::new(NoopGeocoder),
        }
    }
}

impl Capabilities {
    pub fn from_config(config: &metascan_core::Config) -> anyhow::Result<Self> {
        Ok(Self {
            geocoder: geocoder_from_config(config)?,
            ..Self::default()
        })
    }

    pub fn availability(&self) -> CapabilityReport {
        CapabilityReport {
            qr: self.qr_decoder.is_available(),
            steganography: self.lsb_sampler.is_available(),
            geocoding: self.geocoder.is_available(),
            metadata_removal: true,
        }
    }

    /// One startup line per capability.
    pub fn log_availability(&self) {
        let report = self.availability();
        for (name, available) in [
            ("QR code detection", report.qr),
            ("Steganography analysis", report.steganography),
            ("Reverse geocoding", report.geocoding),
            ("Metadata removal", report.metadata_removal),
        ] {
            if available {
                tracing::info!(capability = name, "{} available", name);
            } else {
                tracing::info!(capability = name, "{} disabled", name);
            }
        }
    }
}
