//! Application state shared by every handler.
//!
//! The artifact store is constructed here and injected into both the clean
//! service and the download handler; its reaper is owned by the server.

use metascan_core::Config;
use metascan_services::{
    AnalysisPipeline, ArtifactStore, Capabilities, CleanService, MediaValidator,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub validator: MediaValidator,
    pub pipeline: AnalysisPipeline,
    pub clean_service: CleanService,
    pub store: Arc<ArtifactStore>,
}

impl AppState {
    /// Assemble state from configuration with the given capabilities and store.
    pub fn new(
        config: Config,
        capabilities: Capabilities,
        store: Arc<ArtifactStore>,
    ) -> Result<Self, anyhow::Error> {
        let validator = MediaValidator::from_config(&config);
        let pipeline = AnalysisPipeline::new(&config, capabilities)?;
        let clean_service = CleanService::new(store.clone());

        Ok(Self {
            config,
            validator,
            pipeline,
            clean_service,
            store,
        })
    }
}
