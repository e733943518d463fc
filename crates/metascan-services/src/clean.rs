//! Metadata removal and artifact hand-off

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use metascan_core::{AppError, CleanOutcome};
use metascan_processing::{detect_format, strip_metadata};

use crate::artifacts::ArtifactStore;

const FALLBACK_STEM: &str = "image";

/// Reduce a client-supplied filename to a safe basename: path components are
/// dropped, whitespace becomes `_`, anything outside `[A-Za-z0-9._-]` is removed.
pub fn secure_filename(filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = basename
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

/// `<stem>_clean.<ext>` for the uploaded name. Falls back to the detected
/// format's extension when the name has none.
pub fn clean_filename(filename: &str, data: &[u8]) -> String {
    let safe = secure_filename(filename);
    let path = Path::new(&safe);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_STEM);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_string)
        .or_else(|| detect_format(data).map(|f| f.canonical_extension().to_string()));

    match extension {
        Some(ext) => format!("{}_clean.{}", stem, ext),
        None => format!("{}_clean", stem),
    }
}

/// Strips metadata and parks the result in the artifact store.
#[derive(Clone)]
pub struct CleanService {
    store: Arc<ArtifactStore>,
}

impl CleanService {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    #[cfg(test)]
    fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    #[tracing::instrument(skip(self, data), fields(size = data.len()))]
    pub async fn clean(&self, data: Bytes, filename: &str) -> Result<CleanOutcome, AppError> {
        let download_filename = clean_filename(filename, &data);

        let stripped = tokio::task::spawn_blocking(move || strip_metadata(&data))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to clean image: {}", e)))??;

        let token = self
            .store
            .put(
                Bytes::from(stripped.bytes),
                &download_filename,
                stripped.size_reduction,
            )
            .await;

        tracing::info!(
            download_filename = %download_filename,
            size_reduction = stripped.size_reduction,
            "Image cleaned"
        );

        Ok(CleanOutcome {
            success: true,
            download_token: token,
            download_filename,
            size_reduction: stripped.size_reduction,
        })
    }
}
