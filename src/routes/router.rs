use crate::origin::{self, AllowedOrigins};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::health;
use super::AppState;

/// Create application router.
///
/// Assembles the request pipeline around the two collaborator routers:
/// request tracing and origin enforcement wrap everything, so a denied
/// origin is rejected before any route handler (or body/cookie extractor)
/// runs. The collaborators are injected rather than constructed here so
/// tests can swap them per run.
pub fn create_router(
    state: Arc<AppState>,
    allowed_origins: AllowedOrigins,
    auth_router: Router<Arc<AppState>>,
    user_router: Router<Arc<AppState>>,
) -> Router {
    Router::new()
        .route("/", get(health::liveness))
        .nest("/api/auth", auth_router)
        .nest("/api/user", user_router)
        .layer(middleware::from_fn_with_state(
            allowed_origins,
            origin::enforce,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
