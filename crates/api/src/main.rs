use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invite_api::config::ServerConfig;
use invite_api::router::build_app_router;
use invite_api::sessions::start_idle_sweep;
use invite_api::state::AppState;
use invite_db::PgStore;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invite_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => {
            tracing::info!("Graceful shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

    let pool = invite_db::create_pool(&database_url)
        .await
        .map_err(|e| format!("Failed to connect to database: {e}"))?;
    tracing::info!("Database connection pool created");

    invite_db::health_check(&pool)
        .await
        .map_err(|e| format!("Database health check failed: {e}"))?;
    tracing::info!("Database health check passed");

    invite_db::run_migrations(&pool)
        .await
        .map_err(|e| format!("Failed to run database migrations: {e}"))?;
    tracing::info!("Database migrations applied");

    // --- App state ---
    let store = Arc::new(PgStore::new(pool));
    let state = AppState::new(store.clone(), store, config.clone());

    // --- Background tasks ---
    let sweep_handle = start_idle_sweep(state.sessions.clone());
    tracing::info!(
        idle_timeout_secs = config.session_idle_timeout_secs,
        "Idle session sweep started"
    );

    // --- Router ---
    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .map_err(|e| format!("Invalid HOST address '{}': {e}", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {addr}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {e}"))?;

    tracing::info!("Server stopped accepting connections");

    sweep_handle.abort();
    tracing::info!("Idle session sweep stopped");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
