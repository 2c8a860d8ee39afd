use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use std::str::FromStr;
use std::time::Duration;

/// Handle to the backing Postgres database.
///
/// This layer only owns connectivity; all query surface belongs to the
/// authentication and user services that mount their routers here.
#[derive(Clone)]
pub struct Repository {
    pub pool: PgPool,
}

impl Repository {
    /// Wrap an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and verify the connection.
    ///
    /// Startup must fail loudly if the database is unreachable, so this
    /// both establishes the pool and pings it before returning.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| AppError::Configuration(format!("Invalid database URL: {}", e)))?
            .disable_statement_logging();

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_with(options)
            .await?;

        let repository = Self { pool };
        repository.ping().await?;

        Ok(repository)
    }

    /// Round-trip to the database to confirm it is reachable
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
