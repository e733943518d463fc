use metascan_api::setup;
use metascan_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (telemetry, capabilities, artifact store, routes)
    let app = setup::initialize_app(config.clone()).await?;

    // Start the server; stops the reaper on shutdown
    setup::server::start_server(&config, app.router, app.reaper).await?;

    Ok(())
}
