use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod middleware;
mod models;
mod pass;
mod routes;
mod state;
mod validation;

use common::{
    accounts::PgAccountStore,
    cache::{RedisConfig, RedisPool},
    config::ServiceConfig,
    database::{self, DatabaseConfig, init_pool},
    token::TokenVerifier,
};

use crate::{pass::PassIssuer, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting API service");

    let settings = ServiceConfig::from_env("0.0.0.0:3001")?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    database::run_migrations(&pool).await?;

    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
    if !redis_pool.health_check().await? {
        anyhow::bail!("Failed to connect to Redis");
    }

    let app_state = AppState {
        accounts: Arc::new(PgAccountStore::new(pool)),
        passes: PassIssuer::new(
            Arc::new(redis_pool),
            Duration::from_millis(settings.pass_issue_delay_ms),
        ),
        verifier: TokenVerifier::from_env()?,
    };

    info!("API service initialized successfully");

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!("API service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
