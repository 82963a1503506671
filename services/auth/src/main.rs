use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod jwt;
mod rate_limiter;
mod routes;

use common::{
    accounts::{AccountStore, PgAccountStore},
    cache::{KeyValueStore, RedisConfig, RedisPool},
    config::ServiceConfig,
    database,
};

use crate::{
    jwt::{JwtConfig, JwtService},
    rate_limiter::{RateLimiter, RateLimiterConfig},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub cache: Arc<dyn KeyValueStore>,
    pub jwt_service: JwtService,
    pub rate_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting authentication service");

    let settings = ServiceConfig::from_env("0.0.0.0:3000")?;

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    database::run_migrations(&pool).await?;

    let accounts = PgAccountStore::new(pool);

    match (
        &settings.bootstrap_superadmin_email,
        &settings.bootstrap_superadmin_password,
    ) {
        (Some(email), Some(password)) => {
            bootstrap::ensure_superadmin(&accounts, email, password).await?;
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("Superadmin bootstrap needs both an email and a password, skipping");
        }
        (None, None) => {}
    }

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    // Initialize Redis connection pool
    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;

    let app_state = AppState {
        accounts: Arc::new(accounts),
        cache: Arc::new(redis_pool),
        jwt_service,
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
    };

    info!("Authentication service initialized successfully");

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_address).await?;
    info!("Authentication service listening on {}", settings.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
