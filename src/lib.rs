//! authgate - HTTP bootstrap layer for the auth backend.
//!
//! This crate owns everything that happens before a request reaches a
//! business router: configuration loading, database connectivity, CORS
//! origin enforcement, pipeline assembly, and server lifecycle. The
//! authentication and user routers are collaborators supplied by the
//! embedding service binary and mounted under `/api/auth` and `/api/user`
//! via [`server::run_server`] or [`routes::create_router`].

pub mod config;
pub mod db;
pub mod error;
pub mod origin;
pub mod routes;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use origin::{AllowedOrigins, Decision};
