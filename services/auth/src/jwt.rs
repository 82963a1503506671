//! JWT service for token generation, validation, and management
//!
//! This module signs RS256 access and refresh tokens for staff accounts,
//! rotates refresh tokens and keeps a revocation list in the key-value store.

use anyhow::Result;
use common::accounts::Account;
use common::cache::KeyValueStore;
use common::token::{Claims, TokenType, TokenVerifier, load_pem_from_env, unix_now};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens
    pub private_key: String,
    /// Public key for verifying tokens
    pub public_key: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_PRIVATE_KEY`: Private key (PEM) or path to the private key file
    /// - `JWT_PUBLIC_KEY`: Public key (PEM) or path to the public key file
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Access token expiry in seconds (default: 900)
    /// - `JWT_REFRESH_TOKEN_EXPIRY`: Refresh token expiry in seconds (default: 604800)
    pub fn from_env() -> Result<Self> {
        let private_key = load_pem_from_env("JWT_PRIVATE_KEY")?;
        let public_key = load_pem_from_env("JWT_PUBLIC_KEY")?;

        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);

        let refresh_token_expiry = std::env::var("JWT_REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            private_key,
            public_key,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

fn revocation_key(token: &str) -> String {
    format!("blacklisted_token:{}", token)
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    verifier: TokenVerifier,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let verifier = TokenVerifier::new(&config.public_key)?;

        Ok(JwtService {
            encoding_key,
            verifier,
            config,
        })
    }

    fn sign(&self, account: &Account, token_type: TokenType, lifetime: u64) -> Result<String> {
        let now = unix_now();
        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            role: account.role,
            iat: now,
            exp: now + lifetime,
            token_type,
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Generate an access token for an account
    pub fn generate_access_token(&self, account: &Account) -> Result<String> {
        self.sign(account, TokenType::Access, self.config.access_token_expiry)
    }

    /// Generate a refresh token for an account
    pub fn generate_refresh_token(&self, account: &Account) -> Result<String> {
        self.sign(account, TokenType::Refresh, self.config.refresh_token_expiry)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        self.verifier.validate(token)
    }

    /// Check if a token has been revoked
    pub async fn is_token_revoked(&self, store: &dyn KeyValueStore, token: &str) -> Result<bool> {
        Ok(store.get(&revocation_key(token)).await?.is_some())
    }

    /// Revoke a token for `expiry` seconds
    pub async fn revoke_token(
        &self,
        store: &dyn KeyValueStore,
        token: &str,
        expiry: u64,
    ) -> Result<()> {
        store.set(&revocation_key(token), "1", Some(expiry)).await?;
        Ok(())
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.config.access_token_expiry
    }

    /// Get the refresh token expiry time
    pub fn refresh_token_expiry(&self) -> u64 {
        self.config.refresh_token_expiry
    }

    /// Rotate a refresh token
    ///
    /// The old refresh token is revoked for its remaining lifetime and a new
    /// one is issued for the same account.
    pub async fn rotate_refresh_token(
        &self,
        store: &dyn KeyValueStore,
        account: &Account,
        old_refresh_token: &str,
    ) -> Result<String> {
        let claims = self.validate_token(old_refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            anyhow::bail!("Token is not a refresh token");
        }

        if claims.sub != account.id {
            anyhow::bail!("Token does not belong to account");
        }

        self.revoke_token(store, old_refresh_token, claims.remaining_lifetime())
            .await?;

        self.generate_refresh_token(account)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use common::Role;
    use common::cache::MemoryStore;

    pub(crate) const PRIVATE_KEY: &str =
        include_str!("../../../libs/common/tests/fixtures/jwt_test_private.pem");
    pub(crate) const PUBLIC_KEY: &str =
        include_str!("../../../libs/common/tests/fixtures/jwt_test_public.pem");

    pub(crate) fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            private_key: PRIVATE_KEY.to_string(),
            public_key: PUBLIC_KEY.to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 3600,
        })
        .unwrap()
    }

    fn account(role: Role) -> Account {
        Account {
            id: Uuid::new_v4(),
            full_name: "Jose Rizal".to_string(),
            email: "jose.rizal@neu.edu.ph".to_string(),
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_carries_role() {
        let service = test_service();
        let account = account(Role::Superadmin);

        let token = service.generate_access_token(&account).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.role, Role::Superadmin);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[tokio::test]
    async fn test_rotate_revokes_old_refresh_token() {
        let service = test_service();
        let store = MemoryStore::new();
        let account = account(Role::Admin);

        let old = service.generate_refresh_token(&account).unwrap();
        let new = service
            .rotate_refresh_token(&store, &account, &old)
            .await
            .unwrap();

        assert_ne!(old, new);
        assert!(service.is_token_revoked(&store, &old).await.unwrap());
        assert!(!service.is_token_revoked(&store, &new).await.unwrap());
    }

    #[tokio::test]
    async fn test_rotate_rejects_access_tokens_and_foreign_accounts() {
        let service = test_service();
        let store = MemoryStore::new();
        let owner = account(Role::Admin);
        let other = account(Role::Admin);

        let access = service.generate_access_token(&owner).unwrap();
        assert!(
            service
                .rotate_refresh_token(&store, &owner, &access)
                .await
                .is_err()
        );

        let refresh = service.generate_refresh_token(&owner).unwrap();
        assert!(
            service
                .rotate_refresh_token(&store, &other, &refresh)
                .await
                .is_err()
        );
        assert!(!service.is_token_revoked(&store, &refresh).await.unwrap());
    }
}
