//! Integration tests for the infrastructure components
//!
//! These tests verify that PostgreSQL and Redis are configured and that the
//! account store and key-value store work against them. They need live
//! services, so they are ignored by default:
//!
//! ```text
//! cargo test -p common -- --ignored
//! ```

use common::{
    Role,
    accounts::{AccountStore, NewAccount, PgAccountStore},
    cache::{KeyValueStore, RedisConfig, RedisPool},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    password::hash_password,
};

#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    assert!(health_check(&pool).await?, "Database health check failed");
    run_migrations(&pool).await?;

    let accounts = PgAccountStore::new(pool.clone());
    let email = format!("integration-{}@neu.edu.ph", uuid::Uuid::new_v4());
    let created = accounts
        .create(NewAccount {
            full_name: "Integration Admin".to_string(),
            email: email.clone(),
            role: Role::Admin,
            password_hash: hash_password("Integration#1")?,
        })
        .await?;

    let found = accounts.find_by_email(&email).await?;
    assert_eq!(found.map(|a| a.id), Some(created.id));
    assert!(accounts.delete(created.id).await?);

    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;
    assert!(redis_pool.health_check().await?, "Redis health check failed");

    let test_key = "integration_test_key";
    assert!(redis_pool.set_if_absent(test_key, "first", 10).await?);
    assert!(!redis_pool.set_if_absent(test_key, "second", 10).await?);
    assert_eq!(redis_pool.get(test_key).await?, Some("first".to_string()));

    redis_pool.delete(test_key).await?;
    assert_eq!(redis_pool.get(test_key).await?, None);

    Ok(())
}
