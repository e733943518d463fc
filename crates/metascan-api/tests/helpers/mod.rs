//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p metascan-api --test api_test`.
//! No global tracing subscriber is installed and no reaper is started; tests
//! drive expiry with a manual clock and purge the store directly.

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::Utc;
use metascan_api::setup::routes;
use metascan_api::state::AppState;
use metascan_core::Config;
use metascan_services::{ArtifactStore, Capabilities, ManualClock};
use std::sync::Arc;
use std::time::Duration;

/// Test application: server plus handles on the state it serves.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.state.store
    }
}

/// Setup test app with default configuration and a manual clock.
pub fn setup_test_app() -> TestApp {
    let config = Config::default();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = Arc::new(ArtifactStore::with_clock(
        Duration::from_secs(config.artifact_ttl_secs()),
        clock.clone(),
    ));
    let state = Arc::new(
        AppState::new(config.clone(), Capabilities::default(), store).expect("build state"),
    );
    let router = routes::setup_routes(&config, state.clone()).expect("build router");
    let server = TestServer::new(router).expect("start test server");

    TestApp {
        server,
        state,
        clock,
    }
}

/// Multipart form with a single `file` field.
pub fn file_form(data: Vec<u8>, filename: &str, mime: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data).file_name(filename).mime_type(mime),
    )
}
