//! WheelTools API server entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wheeltools_api::error::AppError;
use wheeltools_api::settings::Settings;
use wheeltools_api::state::AppState;
use wheeltools_config_store::json_file_repository::JsonFileConfigRepository;
use wheeltools_core::clock::{Clock, SystemClock};
use wheeltools_ipc::client::{CREATE_GAME_CHANNEL, IpcClient};
use wheeltools_ipc::transport::TcpChannelResolver;
use wheeltools_roster::application::accrual::AccrualEngine;
use wheeltools_roster::application::roster_store::RosterStore;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting WheelTools API server");

    let settings = Settings::from_env()?;

    // Roster, loaded once; members from the previous run are cleared.
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repository = Arc::new(JsonFileConfigRepository::new(&settings.config_path));
    let store = Arc::new(RosterStore::open(repository, clock.clone())?);
    tracing::info!(path = %settings.config_path.display(), "configuration loaded");

    // Create-game channel, resolved on first use.
    let resolver = TcpChannelResolver::new().register(CREATE_GAME_CHANNEL, settings.ipc_addr);
    let ipc = Arc::new(IpcClient::new(Arc::new(resolver)));

    let app_state = AppState::new(clock.clone(), store.clone(), ipc, settings.delivery());
    let accrual = AccrualEngine::spawn(store, clock, settings.tick);

    let app = wheeltools_api::build_router(app_state);

    // Start server.
    let addr = settings.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    accrual.shutdown().await;
    tracing::info!("WheelTools API server stopped");

    Ok(())
}
