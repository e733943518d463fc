//! Configuration module
//!
//! Server, upload-validation, artifact lifetime and capability settings, read
//! from the environment (and an optional `.env` file).

use std::env;

use crate::constants::{
    ANALYSIS_TIMEOUT_SECS, ARTIFACT_TTL_SECS, DEFAULT_ALLOWED_CONTENT_TYPES,
    DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_GEOCODER_URL, DEFAULT_PORT, MAX_FILE_SIZE_MB,
    REAPER_INTERVAL_SECS, SCRIPT_SCAN_WINDOW_BYTES,
};

/// Log output format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub log_format: LogFormat,
}

/// Analyzer configuration
#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    pub base: BaseConfig,
    // Upload validation
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    // Cleaned artifact lifetime
    pub artifact_ttl_secs: u64,
    pub reaper_interval_secs: u64,
    // Pipeline
    pub analysis_timeout_secs: u64,
    pub script_scan_window_bytes: usize,
    // Reverse geocoding
    pub geocoding_enabled: bool,
    pub geocoder_url: String,
}

fn megabytes_to_bytes(mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", mb))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                server_port: DEFAULT_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                log_format: LogFormat::Text,
            },
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_extensions: split_list(DEFAULT_ALLOWED_EXTENSIONS),
            allowed_content_types: split_list(DEFAULT_ALLOWED_CONTENT_TYPES),
            artifact_ttl_secs: ARTIFACT_TTL_SECS,
            reaper_interval_secs: REAPER_INTERVAL_SECS,
            analysis_timeout_secs: ANALYSIS_TIMEOUT_SECS,
            script_scan_window_bytes: SCRIPT_SCAN_WINDOW_BYTES,
            geocoding_enabled: false,
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_extensions = split_list(
            &env::var("ALLOWED_EXTENSIONS")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_EXTENSIONS.to_string()),
        );

        let allowed_content_types = split_list(
            &env::var("ALLOWED_CONTENT_TYPES")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_CONTENT_TYPES.to_string()),
        );

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            log_format: LogFormat::parse(
                &env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            ),
        };

        Ok(Self {
            base,
            max_file_size_bytes: megabytes_to_bytes(max_file_size_mb)?,
            allowed_extensions,
            allowed_content_types,
            artifact_ttl_secs: env::var("ARTIFACT_TTL_SECS")
                .unwrap_or_else(|_| ARTIFACT_TTL_SECS.to_string())
                .parse()
                .unwrap_or(ARTIFACT_TTL_SECS),
            reaper_interval_secs: env::var("REAPER_INTERVAL_SECS")
                .unwrap_or_else(|_| REAPER_INTERVAL_SECS.to_string())
                .parse()
                .unwrap_or(REAPER_INTERVAL_SECS),
            analysis_timeout_secs: env::var("ANALYSIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| ANALYSIS_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(ANALYSIS_TIMEOUT_SECS),
            script_scan_window_bytes: env::var("SCRIPT_SCAN_WINDOW_BYTES")
                .unwrap_or_else(|_| SCRIPT_SCAN_WINDOW_BYTES.to_string())
                .parse()
                .unwrap_or(SCRIPT_SCAN_WINDOW_BYTES),
            geocoding_enabled: env::var("GEOCODING_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.artifact_ttl_secs == 0 {
            return Err(anyhow::anyhow!("ARTIFACT_TTL_SECS must be greater than 0"));
        }

        if self.reaper_interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "REAPER_INTERVAL_SECS must be greater than 0"
            ));
        }

        if self.analysis_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "ANALYSIS_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.allowed_extensions.is_empty() || self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS and ALLOWED_CONTENT_TYPES must not be empty"
            ));
        }

        if self.geocoding_enabled && !self.geocoder_url.starts_with("http") {
            return Err(anyhow::anyhow!(
                "GEOCODER_URL must be an http(s) URL when GEOCODING_ENABLED=true"
            ));
        }

        Ok(())
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AnalyzerConfig>);

impl Config {
    fn as_analyzer(&self) -> &AnalyzerConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_analyzer().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AnalyzerConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_analyzer().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_analyzer().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_analyzer().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_analyzer().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.as_analyzer().base.log_format
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_analyzer().max_file_size_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_analyzer().allowed_extensions
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_analyzer().allowed_content_types
    }

    pub fn artifact_ttl_secs(&self) -> u64 {
        self.as_analyzer().artifact_ttl_secs
    }

    pub fn reaper_interval_secs(&self) -> u64 {
        self.as_analyzer().reaper_interval_secs
    }

    pub fn analysis_timeout_secs(&self) -> u64 {
        self.as_analyzer().analysis_timeout_secs
    }

    pub fn script_scan_window_bytes(&self) -> usize {
        self.as_analyzer().script_scan_window_bytes
    }

    pub fn geocoding_enabled(&self) -> bool {
        self.as_analyzer().geocoding_enabled
    }

    pub fn geocoder_url(&self) -> &str {
        &self.as_analyzer().geocoder_url
    }
}

impl Default for Config {
    fn default() -> Self {
        Config(Box::new(AnalyzerConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_upload_limits() {
        let config = Config::default();
        assert_eq!(config.max_file_size_bytes(), 16 * 1024 * 1024);
        assert_eq!(config.artifact_ttl_secs(), 180);
        assert_eq!(config.reaper_interval_secs(), 60);
        assert!(config.allowed_extensions().contains(&"tiff".to_string()));
        assert!(config
            .allowed_content_types()
            .contains(&"image/webp".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut inner = AnalyzerConfig::default();
        inner.artifact_ttl_secs = 0;
        assert!(Config(Box::new(inner)).validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let mut inner = AnalyzerConfig::default();
        inner.base.environment = "Prod".to_string();
        assert!(Config(Box::new(inner)).is_production());
        assert!(!Config::default().is_production());
    }

    #[test]
    fn test_file_size_conversion_rejects_overflow() {
        assert_eq!(megabytes_to_bytes(16).unwrap(), 16 * 1024 * 1024);
        assert!(megabytes_to_bytes(usize::MAX).is_err());
        assert!(megabytes_to_bytes(usize::MAX / 1024).is_err());
    }

    #[test]
    fn test_split_list_normalizes() {
        assert_eq!(split_list(" PNG, jpg ,,gif"), vec!["png", "jpg", "gif"]);
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }
}
