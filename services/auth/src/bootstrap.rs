//! First-run superadmin provisioning

use anyhow::Result;
use common::Role;
use common::accounts::{AccountStore, NewAccount};
use common::password::hash_password;
use tracing::info;

/// Create a superadmin with `email` unless an account already uses it.
///
/// Returns whether an account was created.
pub async fn ensure_superadmin(
    accounts: &dyn AccountStore,
    email: &str,
    password: &str,
) -> Result<bool> {
    if accounts.find_by_email(email).await?.is_some() {
        return Ok(false);
    }

    let account = accounts
        .create(NewAccount {
            full_name: "Superadmin".to_string(),
            email: email.to_string(),
            role: Role::Superadmin,
            password_hash: hash_password(password)?,
        })
        .await?;

    info!("Provisioned superadmin account {}", account.email);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::accounts::MemoryAccountStore;

    #[tokio::test]
    async fn test_provisions_once() -> Result<()> {
        let accounts = MemoryAccountStore::new();

        assert!(ensure_superadmin(&accounts, "root@neu.edu.ph", "Root#Pass1").await?);
        assert!(!ensure_superadmin(&accounts, "ROOT@neu.edu.ph", "Other#Pass1").await?);

        let counts = accounts.count_by_role().await?;
        assert_eq!(counts[&Role::Superadmin], 1);
        Ok(())
    }
}
