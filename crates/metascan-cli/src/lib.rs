//! Offline MetaScan: the same pipeline and validation as the HTTP service,
//! driven from local files.

use anyhow::Context;
use metascan_core::{AnalysisReport, Config};
use metascan_processing::{
    strip_metadata, AnalysisPipeline, Capabilities, MediaValidator, SourceFile,
};
use metascan_services::clean_filename;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Local files carry no declared type; validation falls back to the extension.
const UNDECLARED_CONTENT_TYPE: &str = "application/octet-stream";

/// Result of `metascan clean`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub success: bool,
    pub output: PathBuf,
    pub size_reduction: i64,
}

fn file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no usable file name", path.display()))
}

/// Read `path` and reject it under the same rules as an upload.
fn read_validated(path: &Path, validator: &MediaValidator) -> anyhow::Result<(Vec<u8>, String)> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let filename = file_name(path)?;
    validator
        .validate_all(&filename, UNDECLARED_CONTENT_TYPE, data.len())
        .with_context(|| format!("{} rejected", path.display()))?;
    Ok((data, filename))
}

/// Run every detector over `path`.
pub async fn analyze_file(config: &Config, path: &Path) -> anyhow::Result<AnalysisReport> {
    let validator = MediaValidator::from_config(config);
    let (data, filename) = read_validated(path, &validator)?;

    let capabilities = Capabilities::from_config(config)?;
    let pipeline = AnalysisPipeline::new(config, capabilities)?;

    Ok(pipeline
        .analyze(SourceFile::new(data, filename, UNDECLARED_CONTENT_TYPE))
        .await)
}

/// Strip metadata from `input` and write the result. Without `output` the
/// cleaned copy lands next to the input as `<stem>_clean.<ext>`.
pub fn clean_file(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
) -> anyhow::Result<CleanSummary> {
    let validator = MediaValidator::from_config(config);
    let (data, filename) = read_validated(input, &validator)?;

    let stripped = strip_metadata(&data)
        .with_context(|| format!("Failed to clean {}", input.display()))?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_file_name(clean_filename(&filename, &data)),
    };
    std::fs::write(&output, &stripped.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        output = %output.display(),
        size_reduction = stripped.size_reduction,
        "Image cleaned"
    );

    Ok(CleanSummary {
        success: true,
        output,
        size_reduction: stripped.size_reduction,
    })
}

/// Serialize for stdout.
pub fn render_json(value: &impl Serialize, pretty: bool) -> anyhow::Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    out.context("Serialize output")
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}
