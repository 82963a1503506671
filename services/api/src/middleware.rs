//! Role guards for the admin and superadmin route groups

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::{AuthUser, Role, RouteGuard, Session};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

async fn guard(
    state: &AppState,
    route_guard: RouteGuard,
    bearer: BearerHeader,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer.as_ref().map(|TypedHeader(auth)| auth.token());
    let session = state.verifier.session_for(token);

    if let Some(refusal) = ApiError::from_decision(route_guard.check(&session)) {
        debug!(
            "Guard for {} refused {} {}",
            route_guard.required(),
            req.method(),
            req.uri().path()
        );
        return Err(refusal);
    }

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}

/// Only admin sessions may pass
pub async fn require_admin(
    State(state): State<AppState>,
    bearer: BearerHeader,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    guard(&state, RouteGuard::new(Role::Admin), bearer, req, next).await
}

/// Only superadmin sessions may pass
pub async fn require_superadmin(
    State(state): State<AppState>,
    bearer: BearerHeader,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    guard(&state, RouteGuard::new(Role::Superadmin), bearer, req, next).await
}

/// The account behind a session admitted by one of the guards
pub fn signed_in(session: &Session) -> Result<(&AuthUser, Role), ApiError> {
    match (session.user(), session.role()) {
        (Some(user), Some(role)) => Ok((user, role)),
        _ => Err(ApiError::InternalServerError),
    }
}
