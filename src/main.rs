use anyhow::Context;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seat_booking::{
    config::{Config, LogFormat},
    controllers,
    services::status::StatusReporter,
    AppState,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn init_tracing(config: &Config) {
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log));

    match config.app.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(&config);

    info!(
        environment = %config.app.environment,
        total_tickets = config.inventory.total_tickets,
        "Starting seat booking service"
    );

    // Недоступное хранилище останавливает запуск
    let state = AppState::new(config.clone())
        .await
        .context("failed to initialize seat store")?;

    // --- Start background tasks ---
    let reporter = StatusReporter::new(state.facade.clone());
    reporter.report().await;
    let reporter_task = reporter.spawn();

    // --- Start the web server ---
    let app = controllers::app(state.clone());

    let ip = config
        .app
        .host
        .parse::<std::net::IpAddr>()
        .with_context(|| format!("HOST '{}' is not an IP address", config.app.host))?;
    let addr = SocketAddr::new(ip, config.app.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    reporter_task.abort();
    state.facade.close().await;
    info!("Seat booking service stopped");
    Ok(())
}
