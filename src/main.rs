//! Family groups server entry point.

use std::process::ExitCode;
use std::time::Duration;

use family_groups::api::create_router;
use family_groups::application::accounts::purge_expired_sessions;
use family_groups::infrastructure::{
    AppConfig, AppDependencies, ConfigError, FactoryError, RepositoryFactory,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_LOG_FILTER: &str = "family_groups=debug,tower_http=info";
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] FactoryError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before the subscriber so RUST_LOG and LOG_FORMAT apply
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "Server terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    tracing::info!("Starting family groups server...");

    let config = AppConfig::from_env()?;
    if config.uses_development_secret() {
        tracing::warn!("SECRET_KEY is not set; using the development placeholder");
    }
    tracing::info!(
        storage_mode = ?config.storage_mode,
        host = %config.app_host,
        port = config.app_port,
        "Configuration loaded"
    );

    let repositories = RepositoryFactory::from_config(&config).create().await?;
    let bind_address = config.bind_address();
    let dependencies = AppDependencies::new(config, repositories);

    tokio::spawn(sweep_expired_sessions(dependencies.clone()));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = create_router(dependencies)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("Family groups server started on http://{bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Family groups server stopped");
    Ok(())
}

async fn sweep_expired_sessions(dependencies: AppDependencies) {
    let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(error) = purge_expired_sessions(&dependencies).await {
            tracing::warn!(%error, "Expired session sweep failed");
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(error) => {
            tracing::error!(%error, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
