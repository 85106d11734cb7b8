//! Video Keeper - library for app logic and testing

pub mod config;
pub mod constants;
pub mod domain;
pub mod draft;
pub mod forms;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod picker;
pub mod routes;
pub mod services;
#[cfg(test)]
mod test_support;

use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;

use config::{AppConfig, ConfigError};
use services::identity::{IdentityClient, IdentityError, IdentityProvider};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub identity: Arc<dyn IdentityProvider>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("identity provider: {0}")]
    Identity(#[from] IdentityError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect, migrate and serve until the listener fails
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let addr = config.bind_addr()?;

    let pool = services::db::connect(&config).await?;
    services::db::migrate(&pool).await?;
    tracing::info!(max_connections = config.db_max_connections, "Database ready");

    let identity = IdentityClient::new(&config.auth_project_url, &config.auth_api_key)?;

    let state = Arc::new(AppState {
        db: pool,
        identity: Arc::new(identity),
    });

    let app = routes::build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.environment, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
