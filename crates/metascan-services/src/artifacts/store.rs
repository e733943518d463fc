use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::RngCore;
use tokio::sync::RwLock;

use super::clock::{Clock, SystemClock};
use super::ArtifactError;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
struct StoredArtifact {
    bytes: Bytes,
    filename: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// A cleaned file handed back to a downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDownload {
    pub bytes: Bytes,
    pub filename: String,
}

/// 32 CSPRNG bytes, base64url without padding.
fn generate_token() -> String {
    let mut raw = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut raw);
    URL_SAFE_NO_PAD.encode(raw)
}

/// In-memory store of cleaned files with a fixed time-to-live.
///
/// Entries are never removed by reads; only [`ArtifactStore::purge_expired`]
/// deletes them.
pub struct ArtifactStore {
    entries: RwLock<HashMap<String, StoredArtifact>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl ArtifactStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365)),
            clock,
        }
    }

    pub async fn put(&self, bytes: Bytes, filename: &str, size_reduction: i64) -> String {
        let token = generate_token();
        let created_at = self.clock.now();
        let artifact = StoredArtifact {
            bytes,
            filename: filename.to_string(),
            created_at,
            expires_at: created_at + self.ttl,
        };

        tracing::debug!(
            expires_at = %artifact.expires_at,
            size_reduction,
            "Artifact stored"
        );
        self.entries.write().await.insert(token.clone(), artifact);
        token
    }

    /// Fetch an artifact. Does not extend or consume it.
    #[tracing::instrument(skip(self, token))]
    pub async fn get(&self, token: &str) -> Result<ArtifactDownload, ArtifactError> {
        let entries = self.entries.read().await;
        let artifact = entries.get(token).ok_or(ArtifactError::NotFound)?;

        if self.clock.now() >= artifact.expires_at {
            tracing::debug!(
                created_at = %artifact.created_at,
                expires_at = %artifact.expires_at,
                "Artifact requested after expiry"
            );
            return Err(ArtifactError::Expired);
        }

        Ok(ArtifactDownload {
            bytes: artifact.bytes.clone(),
            filename: artifact.filename.clone(),
        })
    }

    /// Remove every entry past its expiry. Returns how many were removed.
    #[tracing::instrument(skip(self), fields(artifacts.operation = "purge"))]
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let mut freed_bytes = 0usize;
        entries.retain(|_, artifact| {
            let live = now < artifact.expires_at;
            if !live {
                freed_bytes += artifact.bytes.len();
            }
            live
        });
        let purged = before - entries.len();

        if purged > 0 {
            tracing::info!(
                purged,
                freed_bytes,
                remaining = entries.len(),
                "Expired artifacts purged"
            );
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
