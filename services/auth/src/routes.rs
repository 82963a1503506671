//! Authentication service routes

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use common::{
    Role,
    accounts::normalize_email,
    password::{hash_password, verify_password},
    token::TokenType,
};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{error, info, warn};

use crate::AppState;

/// Response for token generation
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub role: Role,
}

/// Request for token refresh and logout
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Request for staff login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/:portal/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .with_state(state)
}

fn session_key(account_id: uuid::Uuid) -> String {
    format!("session:{}", account_id)
}

/// Hash verified against when no account matches the login email
fn placeholder_hash() -> &'static str {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| {
        hash_password("neuvis-placeholder").unwrap_or_else(|e| {
            error!("Failed to prepare placeholder hash: {}", e);
            String::new()
        })
    })
}

fn internal<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> AuthError {
    move |e| {
        error!("{}: {}", context, e);
        AuthError::InternalServerError
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Staff login endpoint for the admin and superadmin portals
pub async fn login(
    State(state): State<AppState>,
    Path(portal): Path<Role>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let email = normalize_email(&payload.email);
    info!("Login attempt on {} portal for: {}", portal, email);

    if !state.rate_limiter.is_allowed(&email).await {
        return Err(AuthError::TooManyAttempts);
    }

    let Some(account) = state
        .accounts
        .find_by_email(&email)
        .await
        .map_err(internal("Failed to look up account"))?
    else {
        let _ = verify_password(placeholder_hash(), &payload.password);
        warn!("Login for unknown email: {}", email);
        return Err(AuthError::InvalidCredentials);
    };

    let password_ok = verify_password(&account.password_hash, &payload.password)
        .map_err(internal("Failed to verify password"))?;
    if !password_ok {
        warn!("Invalid password for: {}", email);
        return Err(AuthError::InvalidCredentials);
    }

    if account.role != portal {
        return Err(AuthError::WrongPortal {
            redirect_to: account.role.login_route(),
        });
    }

    let access_token = state
        .jwt_service
        .generate_access_token(&account)
        .map_err(internal("Failed to generate access token"))?;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(&account)
        .map_err(internal("Failed to generate refresh token"))?;

    state
        .cache
        .set(
            &session_key(account.id),
            &refresh_token,
            Some(state.jwt_service.refresh_token_expiry()),
        )
        .await
        .map_err(internal("Failed to store session"))?;

    state.rate_limiter.reset(&email).await;

    let response = TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        role: account.role,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Token refresh request");

    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    if claims.token_type != TokenType::Refresh {
        return Err(AuthError::Unauthorized);
    }

    let revoked = state
        .jwt_service
        .is_token_revoked(state.cache.as_ref(), &payload.refresh_token)
        .await
        .map_err(internal("Failed to check token revocation"))?;
    if revoked {
        return Err(AuthError::Unauthorized);
    }

    let stored = state
        .cache
        .get(&session_key(claims.sub))
        .await
        .map_err(internal("Failed to load session"))?;
    if stored.as_deref() != Some(payload.refresh_token.as_str()) {
        return Err(AuthError::Unauthorized);
    }

    let account = state
        .accounts
        .find_by_id(claims.sub)
        .await
        .map_err(internal("Failed to look up account"))?
        .ok_or(AuthError::Unauthorized)?;

    let access_token = state
        .jwt_service
        .generate_access_token(&account)
        .map_err(internal("Failed to generate access token"))?;

    let new_refresh_token = state
        .jwt_service
        .rotate_refresh_token(state.cache.as_ref(), &account, &payload.refresh_token)
        .await
        .map_err(internal("Failed to rotate refresh token"))?;

    state
        .cache
        .set(
            &session_key(account.id),
            &new_refresh_token,
            Some(state.jwt_service.refresh_token_expiry()),
        )
        .await
        .map_err(internal("Failed to update session"))?;

    let response = TokenResponse {
        access_token,
        refresh_token: new_refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
        role: account.role,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Logout request");

    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token)
        .map_err(|_| AuthError::Unauthorized)?;

    if claims.token_type != TokenType::Refresh {
        return Err(AuthError::Unauthorized);
    }

    let revoked = state
        .jwt_service
        .is_token_revoked(state.cache.as_ref(), &payload.refresh_token)
        .await
        .map_err(internal("Failed to check token revocation"))?;
    if revoked {
        return Err(AuthError::Unauthorized);
    }

    state
        .jwt_service
        .revoke_token(
            state.cache.as_ref(),
            &payload.refresh_token,
            claims.remaining_lifetime(),
        )
        .await
        .map_err(internal("Failed to revoke token"))?;

    let key = session_key(claims.sub);
    let stored = state
        .cache
        .get(&key)
        .await
        .map_err(internal("Failed to load session"))?;

    // A token replaced by a later login leaves the newer session alone
    if stored.as_deref() == Some(payload.refresh_token.as_str()) {
        state
            .cache
            .delete(&key)
            .await
            .map_err(internal("Failed to remove session"))?;
    }

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

/// Custom error type for authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Account is not allowed on this portal")]
    WrongPortal { redirect_to: &'static str },

    #[error("Too many login attempts, try again later")]
    TooManyAttempts,

    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            AuthError::WrongPortal { redirect_to } => (
                StatusCode::FORBIDDEN,
                [(header::LOCATION, redirect_to)],
                Json(serde_json::json!({
                    "error": message,
                    "redirect_to": redirect_to,
                })),
            )
                .into_response(),
            other => {
                let status = match other {
                    AuthError::InvalidCredentials | AuthError::Unauthorized => {
                        StatusCode::UNAUTHORIZED
                    }
                    AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Json(serde_json::json!({ "error": message }))).into_response()
            }
        }
    }
}
