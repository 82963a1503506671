//! Custom error types for the API service

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::{GuardDecision, RedirectReason};
use serde_json::json;
use thiserror::Error;

use crate::pass::PassError;
use crate::validation::FieldErrors;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// The route guard sent the caller to a login screen
    #[error("{}", redirect_message(.reason))]
    Redirect {
        to: &'static str,
        reason: RedirectReason,
    },

    /// Form fields failed validation
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body could not be read as the expected JSON
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

fn redirect_message(reason: &RedirectReason) -> &'static str {
    match reason {
        RedirectReason::Unauthenticated => "Sign in to continue",
        RedirectReason::WrongRole => "Your account cannot access this section",
    }
}

impl ApiError {
    /// Convert a refusing guard decision into an error, `None` when allowed
    pub fn from_decision(decision: GuardDecision) -> Option<Self> {
        match decision {
            GuardDecision::Allow => None,
            GuardDecision::Redirect { to, reason } => Some(ApiError::Redirect { to, reason }),
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PassError> for ApiError {
    fn from(e: PassError) -> Self {
        match e {
            PassError::Exhausted(attempts) => {
                tracing::warn!("No free visitor ID after {} attempts", attempts);
                ApiError::ServiceUnavailable("No visitor ID available, try again".to_string())
            }
            other => {
                tracing::error!("Visitor pass store failed: {}", other);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ApiError::Redirect { to, reason } => {
                let status = match reason {
                    RedirectReason::Unauthenticated => StatusCode::UNAUTHORIZED,
                    RedirectReason::WrongRole => StatusCode::FORBIDDEN,
                };
                (
                    status,
                    [(header::LOCATION, to)],
                    Json(json!({ "error": message, "redirect_to": to })),
                )
                    .into_response()
            }
            ApiError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": message, "fields": fields })),
            )
                .into_response(),
            other => {
                let status = match other {
                    ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
                    ApiError::InvalidBody { status, .. } => status,
                    ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                    ApiError::Conflict(_) => StatusCode::CONFLICT,
                    ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
