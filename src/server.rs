//! Server startup and shutdown logic.
//!
//! `run_server` is the single entry point the service binary calls after
//! loading configuration and building its auth/user routers. It handles:
//! - Database connection (startup aborts if the database is unreachable)
//! - Application state creation
//! - Pipeline assembly around the injected collaborator routers
//! - Server binding and graceful shutdown

use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, AppResult};
use crate::origin::AllowedOrigins;
use crate::routes;
use crate::state::AppState;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the web server with the given configuration and collaborator routers.
///
/// The auth and user routers are mounted under `/api/auth` and `/api/user`
/// behind the origin gatekeeper. Returns `Ok(())` on graceful shutdown.
///
/// # Errors
///
/// Returns an error if the database is unreachable, the listen address
/// cannot be bound, or the server fails while running.
pub async fn run_server(
    config: Config,
    auth_router: Router<Arc<AppState>>,
    user_router: Router<Arc<AppState>>,
) -> AppResult<()> {
    info!("Starting authgate server...");

    // The database must be reachable before we accept any traffic.
    info!("Connecting to database...");
    let repository = Repository::connect(&config.database).await?;
    info!("Database connection verified");

    let state = Arc::new(AppState { repository });

    let allowed_origins = AllowedOrigins::from_config(config.cors.frontend_url.as_deref());
    for origin in allowed_origins.iter() {
        info!(origin = %origin, "Allowing credentialed origin");
    }

    let app = routes::create_router(state, allowed_origins, auth_router, user_router);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to address {}: {}", addr, e)))?;

    info!("Server listening on {}", addr);

    let shutdown_signal = create_shutdown_signal();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create a future that resolves when a shutdown signal is received.
///
/// On Unix-like systems, this listens for both Ctrl+C (SIGINT) and SIGTERM.
/// On other platforms, it only listens for Ctrl+C.
///
/// # Panics
///
/// Panics if signal handler installation fails. This is intentional because
/// signal handler failures are unrecoverable system-level errors that indicate
/// the OS cannot deliver shutdown signals, making graceful shutdown impossible.
async fn create_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}
