use crate::db::Repository;

/// Application state shared across all HTTP handlers.
///
/// Wrapped in `Arc` and handed to every request handler via Axum's State
/// extraction, including the mounted collaborator routers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle the mounted routers run their queries against
    pub repository: Repository,
}
