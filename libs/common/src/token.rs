//! JWT claims and verification shared by the NEUVIS services
//!
//! Tokens are signed with RS256 by the authentication service. Every other
//! service only holds the public key and uses [`TokenVerifier`] to turn a
//! bearer token into a [`Session`].

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

use crate::session::{AuthUser, Role, Session};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: Uuid,
    /// Account email
    pub email: String,
    /// Account role
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Unique token ID, so two tokens issued in the same second differ
    pub jti: Uuid,
}

impl Claims {
    pub fn into_session(self) -> Session {
        Session::authenticated(
            AuthUser {
                id: self.sub,
                email: self.email,
            },
            self.role,
        )
    }

    /// Seconds until this token expires, zero if it already has
    pub fn remaining_lifetime(&self) -> u64 {
        self.exp.saturating_sub(unix_now())
    }
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// Current time as seconds since the Unix epoch
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Read a PEM key from an environment variable.
///
/// The variable holds either the PEM text itself or a path to a PEM file.
/// Relative paths are tried from the working directory, then from the crate root.
pub fn load_pem_from_env(var: &str) -> Result<String> {
    let value =
        std::env::var(var).map_err(|_| anyhow::anyhow!("{} environment variable not set", var))?;

    if value.starts_with("-----BEGIN") {
        return Ok(value);
    }

    let pem = std::fs::read_to_string(&value)
        .or_else(|_| {
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(&value);
            std::fs::read_to_string(path)
        })
        .map_err(|e| anyhow::anyhow!("Failed to read key file for {}: {}", var, e))?;

    Ok(pem.trim().to_string())
}

/// Verifies RS256 tokens with the service public key
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(public_key_pem: &str) -> Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Create a verifier from `JWT_PUBLIC_KEY`
    pub fn from_env() -> Result<Self> {
        Self::new(&load_pem_from_env("JWT_PUBLIC_KEY")?)
    }

    /// Validate a token and return the claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Resolve the session carried by an optional bearer token.
    ///
    /// Anything other than a valid, unexpired access token is anonymous.
    pub fn session_for(&self, bearer: Option<&str>) -> Session {
        let Some(token) = bearer else {
            return Session::Anonymous;
        };

        match self.validate(token) {
            Ok(claims) if claims.token_type == TokenType::Access => claims.into_session(),
            Ok(_) => {
                debug!("Rejected non-access token presented as bearer");
                Session::Anonymous
            }
            Err(e) => {
                debug!("Rejected bearer token: {}", e);
                Session::Anonymous
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const PRIVATE_KEY: &str = include_str!("../tests/fixtures/jwt_test_private.pem");
    const PUBLIC_KEY: &str = include_str!("../tests/fixtures/jwt_test_public.pem");

    fn sign(claims: &Claims) -> String {
        let key = EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap();
        encode(&Header::new(Algorithm::RS256), claims, &key).unwrap()
    }

    fn claims(role: Role, token_type: TokenType, exp_offset: i64) -> Claims {
        let now = unix_now();
        Claims {
            sub: Uuid::new_v4(),
            email: "admin@neu.edu.ph".to_string(),
            role,
            iat: now,
            exp: (now as i64 + exp_offset) as u64,
            token_type,
            jti: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_access_token_resolves_to_role_session() {
        let verifier = TokenVerifier::new(PUBLIC_KEY).unwrap();
        let c = claims(Role::Superadmin, TokenType::Access, 900);
        let token = sign(&c);

        let session = verifier.session_for(Some(&token));
        assert_eq!(session.role(), Some(Role::Superadmin));
        assert_eq!(session.user().map(|u| u.id), Some(c.sub));
    }

    #[test]
    fn test_missing_token_is_anonymous() {
        let verifier = TokenVerifier::new(PUBLIC_KEY).unwrap();
        assert!(verifier.session_for(None).is_anonymous());
        assert!(verifier.session_for(Some("not-a-jwt")).is_anonymous());
    }

    #[test]
    fn test_expired_token_is_anonymous() {
        let verifier = TokenVerifier::new(PUBLIC_KEY).unwrap();
        let token = sign(&claims(Role::Admin, TokenType::Access, -3600));
        assert!(verifier.session_for(Some(&token)).is_anonymous());
    }

    #[test]
    fn test_refresh_token_is_not_a_bearer() {
        let verifier = TokenVerifier::new(PUBLIC_KEY).unwrap();
        let token = sign(&claims(Role::Admin, TokenType::Refresh, 900));
        assert!(verifier.validate(&token).is_ok());
        assert!(verifier.session_for(Some(&token)).is_anonymous());
    }

    #[test]
    fn test_remaining_lifetime_saturates() {
        assert_eq!(
            claims(Role::Admin, TokenType::Access, -10).remaining_lifetime(),
            0
        );
        assert!(claims(Role::Admin, TokenType::Access, 100).remaining_lifetime() > 90);
    }
}
