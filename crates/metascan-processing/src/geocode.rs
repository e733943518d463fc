//! Optional reverse geocoding of resolved coordinates

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Turns coordinates into a human-readable place name.
#[async_trait]
pub trait Geocoder: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>>;
}

/// Geocoder used when lookups are disabled or not compiled in.
pub struct NoopGeocoder;

#[async_trait]
impl Geocoder for NoopGeocoder {
    fn is_available(&self) -> bool {
        false
    }

    async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(feature = "geocoding")]
pub use nominatim::NominatimGeocoder;

#[cfg(feature = "geocoding")]
mod nominatim {
    use std::time::Duration;

    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use metascan_core::constants::{GEOCODER_TIMEOUT_SECS, GEOCODER_USER_AGENT};
    use serde::Deserialize;

    use super::Geocoder;

    #[derive(Debug, Deserialize)]
    struct ReverseResponse {
        display_name: Option<String>,
    }

    /// Nominatim-compatible reverse lookup (`/reverse?format=json`).
    pub struct NominatimGeocoder {
        http_client: reqwest::Client,
        base_url: String,
    }

    impl NominatimGeocoder {
        pub fn new(base_url: impl Into<String>) -> Result<Self> {
            let http_client = reqwest::Client::builder()
                .timeout(Duration::from_secs(GEOCODER_TIMEOUT_SECS))
                .user_agent(GEOCODER_USER_AGENT)
                .build()
                .context("Failed to create HTTP client for geocoder")?;

            Ok(Self {
                http_client,
                base_url: base_url.into(),
            })
        }
    }

    #[async_trait]
    impl Geocoder for NominatimGeocoder {
        async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
            let response = self
                .http_client
                .get(&self.base_url)
                .query(&[
                    ("format", "json".to_string()),
                    ("lat", latitude.to_string()),
                    ("lon", longitude.to_string()),
                    ("zoom", "10".to_string()),
                ])
                .send()
                .await
                .context("Failed to send reverse geocoding request")?;

            let status = response.status();
            if !status.is_success() {
                return Err(anyhow::anyhow!(
                    "Reverse geocoding request failed: {}",
                    status
                ));
            }

            let body: ReverseResponse = response
                .json()
                .await
                .context("Failed to parse reverse geocoding response")?;
            Ok(body.display_name.filter(|name| !name.is_empty()))
        }
    }
}

/// Geocoder for the configured settings; lookups stay off unless both enabled
/// and compiled in.
pub fn geocoder_from_config(config: &metascan_core::Config) -> Result<Arc<dyn Geocoder>> {
    if !config.geocoding_enabled() {
        return Ok(Arc::new(NoopGeocoder));
    }

    #[cfg(feature = "geocoding")]
    {
        Ok(Arc::new(NominatimGeocoder::new(config.geocoder_url())?))
    }
    #[cfg(not(feature = "geocoding"))]
    {
        tracing::warn!("GEOCODING_ENABLED is set but geocoding support is not compiled in");
        Ok(Arc::new(NoopGeocoder))
    }
}
