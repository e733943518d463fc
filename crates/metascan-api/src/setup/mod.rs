//! Application setup and initialization
//!
//! Everything `main` needs, split out so tests can build the same router
//! without installing a global tracing subscriber.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use metascan_core::Config;
use metascan_services::{ArtifactReaper, ArtifactStore, Capabilities, ReaperHandle};
use std::sync::Arc;
use std::time::Duration;

/// A composed application: shared state, the router serving it, and the
/// background reaper that must be stopped on shutdown.
pub struct App {
    pub state: Arc<AppState>,
    pub router: axum::Router,
    pub reaper: ReaperHandle,
}

/// Build state from configuration. The artifact store is created here and
/// owned by the returned state.
pub fn build_state(config: Config, capabilities: Capabilities) -> Result<Arc<AppState>> {
    let store = Arc::new(ArtifactStore::new(Duration::from_secs(
        config.artifact_ttl_secs(),
    )));
    let state = AppState::new(config, capabilities, store)?;
    Ok(Arc::new(state))
}

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<App> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    metascan_infra::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let capabilities =
        Capabilities::from_config(&config).context("Failed to set up analysis capabilities")?;
    capabilities.log_availability();

    let state = build_state(config.clone(), capabilities)?;

    let reaper = ArtifactReaper::start(
        state.store.clone(),
        Duration::from_secs(config.reaper_interval_secs()),
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok(App {
        state,
        router,
        reaper,
    })
}
