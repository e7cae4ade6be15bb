use anyhow::Context;
use appraisal_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. .env, then configuration
    dotenv::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    // 2. Logging
    setup_environment(&config);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Appraisal server starting..."
    );

    // 3. State (seed directory) and HTTP server
    let state = ServerState::initialize(&config).context("Failed to initialize server state")?;
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
