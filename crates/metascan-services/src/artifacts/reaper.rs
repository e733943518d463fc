use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::store::ArtifactStore;

/// Periodic purge of expired artifacts.
pub struct ArtifactReaper;

impl ArtifactReaper {
    /// Start the background purge loop. The first cycle runs one `period`
    /// after start.
    pub fn start(store: Arc<ArtifactStore>, period: Duration) -> ReaperHandle {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(period_secs = period.as_secs(), "Artifact reaper started");
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        break;
                    }
                    _ = ticker.tick() => {
                        let purged = store.purge_expired().await;
                        tracing::debug!(purged, "Artifact reaper cycle completed");
                    }
                }
            }
            tracing::info!("Artifact reaper stopped");
        });

        ReaperHandle {
            cancel_token,
            handle,
        }
    }
}

/// Owner of a running reaper; stops it on [`ReaperHandle::shutdown`].
pub struct ReaperHandle {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ReaperHandle {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "Artifact reaper task ended abnormally");
        }
    }
}
