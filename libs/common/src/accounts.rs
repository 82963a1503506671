//! Staff accounts (admins and superadmins)
//!
//! Accounts are the rows the profile screens read (`full_name`, `email`,
//! `role`) plus the credentials the authentication service checks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{DatabaseError, StoreError, StoreResult};
use crate::session::Role;

/// Account entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New account creation payload. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Storage for staff accounts
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// All accounts, newest first
    async fn list(&self) -> StoreResult<Vec<Account>>;

    /// Insert an account, failing with [`StoreError::Conflict`] on a duplicate email
    async fn create(&self, new_account: NewAccount) -> StoreResult<Account>;

    /// Delete an account. Returns whether it existed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Number of accounts per role, including roles with no accounts
    async fn count_by_role(&self) -> StoreResult<HashMap<Role, u64>>;
}

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> StoreResult<Account> {
        let role: String = row.get("role");
        let role = role
            .parse::<Role>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        Ok(Account {
            id: row.get("id"),
            full_name: row.get("full_name"),
            email: row.get("email"),
            role,
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

fn query_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(DatabaseError::Query(e))
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, role, password_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, email, role, password_hash, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT id, full_name, email, role, password_hash, created_at, updated_at
            FROM accounts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn create(&self, new_account: NewAccount) -> StoreResult<Account> {
        info!(
            "Creating {} account: {}",
            new_account.role, new_account.email
        );

        let row = sqlx::query(
            r#"
            INSERT INTO accounts (id, full_name, email, role, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, full_name, email, role, password_hash, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_account.full_name.trim())
        .bind(normalize_email(&new_account.email))
        .bind(new_account.role.as_str())
        .bind(&new_account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("Email {} is already registered", new_account.email))
            }
            other => query_error(other),
        })?;

        Self::from_row(&row)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_role(&self) -> StoreResult<HashMap<Role, u64>> {
        let rows = sqlx::query("SELECT role, COUNT(*) AS total FROM accounts GROUP BY role")
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        let mut counts: HashMap<Role, u64> = Role::ALL.iter().map(|r| (*r, 0)).collect();
        for row in rows {
            let role: String = row.get("role");
            let total: i64 = row.get("total");
            let role = role
                .parse::<Role>()
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            counts.insert(role, total.max(0) as u64);
        }
        Ok(counts)
    }
}

/// In-process account store for tests and local development
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    accounts: Arc<RwLock<Vec<Account>>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let email = normalize_email(email);
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().rev().cloned().collect())
    }

    async fn create(&self, new_account: NewAccount) -> StoreResult<Account> {
        let email = normalize_email(&new_account.email);
        let mut accounts = self.accounts.write().await;

        if accounts.iter().any(|a| a.email == email) {
            return Err(StoreError::Conflict(format!(
                "Email {} is already registered",
                new_account.email
            )));
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            full_name: new_account.full_name.trim().to_string(),
            email,
            role: new_account.role,
            password_hash: new_account.password_hash,
            created_at: now,
            updated_at: now,
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok(accounts.len() != before)
    }

    async fn count_by_role(&self) -> StoreResult<HashMap<Role, u64>> {
        let accounts = self.accounts.read().await;
        let mut counts: HashMap<Role, u64> = Role::ALL.iter().map(|r| (*r, 0)).collect();
        for account in accounts.iter() {
            *counts.entry(account.role).or_default() += 1;
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str, role: Role) -> NewAccount {
        NewAccount {
            full_name: " Maria Santos ".to_string(),
            email: email.to_string(),
            role,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_normalizes_and_finds_by_email() -> StoreResult<()> {
        let store = MemoryAccountStore::new();
        let created = store
            .create(new_account("Maria.Santos@NEU.edu.ph ", Role::Admin))
            .await?;

        assert_eq!(created.full_name, "Maria Santos");
        assert_eq!(created.email, "maria.santos@neu.edu.ph");

        let found = store.find_by_email("MARIA.SANTOS@neu.edu.ph").await?;
        assert_eq!(found, Some(created.clone()));
        assert_eq!(store.find_by_id(created.id).await?, Some(created));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() -> StoreResult<()> {
        let store = MemoryAccountStore::new();
        store.create(new_account("a@neu.edu.ph", Role::Admin)).await?;

        let result = store
            .create(new_account("A@neu.edu.ph", Role::Superadmin))
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_and_count_by_role() -> StoreResult<()> {
        let store = MemoryAccountStore::new();
        let admin = store.create(new_account("a@neu.edu.ph", Role::Admin)).await?;
        store.create(new_account("b@neu.edu.ph", Role::Admin)).await?;

        let counts = store.count_by_role().await?;
        assert_eq!(counts[&Role::Admin], 2);
        assert_eq!(counts[&Role::Superadmin], 0);

        assert!(store.delete(admin.id).await?);
        assert!(!store.delete(admin.id).await?);
        assert_eq!(store.list().await?.len(), 1);
        Ok(())
    }
}
