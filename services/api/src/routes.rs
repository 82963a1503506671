//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_extra::extract::WithRejection;
use chrono::{Local, NaiveDate, Utc};
use common::{Session, accounts::NewAccount, error::StoreError, password::hash_password};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{require_admin, require_superadmin, signed_in},
    models::{
        AccountResponse, CreateAccountRequest, ManualEntryRequest, PassRequest, ProfileView,
        ReportResponse,
    },
    state::AppState,
    validation::{validate_manual_entry, validate_new_account, validate_pass_request},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/profile", get(profile))
        .route("/admin/passes/:visitor_id", get(verify_pass))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let superadmin_routes = Router::new()
        .route("/superadmin/profile", get(profile))
        .route(
            "/superadmin/accounts",
            get(list_accounts).post(create_account),
        )
        .route("/superadmin/accounts/:id", delete(delete_account))
        .route("/superadmin/reports", get(reports))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_superadmin,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/visitors/pass", post(issue_pass))
        .route("/visitors/manual-entry", post(submit_manual_entry))
        .merge(admin_routes)
        .merge(superadmin_routes)
        .with_state(state)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn store_failure(context: &'static str) -> impl FnOnce(StoreError) -> ApiError {
    move |e| match e {
        StoreError::Conflict(message) => ApiError::Conflict(message),
        other => {
            error!("{}: {}", context, other);
            ApiError::InternalServerError
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Issue a one-day visitor pass
pub async fn issue_pass(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<PassRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let form = payload.trimmed();
    validate_pass_request(&form, today())?;

    let pass = state.passes.issue(form).await?;

    Ok((StatusCode::CREATED, Json(pass)))
}

/// Accept a hand-typed visitor entry
pub async fn submit_manual_entry(
    WithRejection(Json(payload), _): WithRejection<Json<ManualEntryRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let form = payload.trimmed();
    validate_manual_entry(&form, today())?;

    info!(
        "Manual visitor entry: {} ({} visit(s)), purpose: {}",
        form.full_name, form.visit_count, form.purpose
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Visitor entry submitted",
            "entry": form,
        })),
    ))
}

/// Profile of the signed-in staff member
pub async fn profile(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Json<ProfileView>> {
    let (user, role) = signed_in(&session)?;

    match state.accounts.find_by_id(user.id).await {
        Ok(Some(account)) => Ok(Json(account.into())),
        Ok(None) => Err(ApiError::NotFound("Account not found".to_string())),
        Err(e) => {
            error!("Failed to load profile for {}: {}", user.id, e);
            Ok(Json(ProfileView::unavailable(role)))
        }
    }
}

/// Look up a live visitor pass
pub async fn verify_pass(
    State(state): State<AppState>,
    Path(visitor_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let pass = state
        .passes
        .lookup(&visitor_id.trim().to_uppercase())
        .await?
        .ok_or_else(|| ApiError::NotFound("Visitor pass not found or expired".to_string()))?;

    Ok(Json(pass))
}

/// List staff accounts
pub async fn list_accounts(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let accounts: Vec<AccountResponse> = state
        .accounts
        .list()
        .await
        .map_err(store_failure("Failed to list accounts"))?
        .into_iter()
        .map(AccountResponse::from)
        .collect();

    Ok(Json(accounts))
}

/// Create a staff account
pub async fn create_account(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateAccountRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    validate_new_account(&payload)?;

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::InternalServerError
    })?;

    let account = state
        .accounts
        .create(NewAccount {
            full_name: payload.full_name,
            email: payload.email,
            role: payload.role,
            password_hash,
        })
        .await
        .map_err(store_failure("Failed to create account"))?;

    info!("Created {} account {}", account.role, account.email);
    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// Delete a staff account
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let (user, _) = signed_in(&session)?;
    if user.id == id {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    let deleted = state
        .accounts
        .delete(id)
        .await
        .map_err(store_failure("Failed to delete account"))?;

    if deleted {
        info!("Account {} deleted by {}", id, user.email);
        Ok(Json(json!({"message": "Account deleted successfully"})))
    } else {
        Err(ApiError::NotFound("Account not found".to_string()))
    }
}

/// Account and visitor pass figures for the superadmin dashboard
pub async fn reports(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let accounts_by_role = state
        .accounts
        .count_by_role()
        .await
        .map_err(store_failure("Failed to count accounts"))?;
    let active_passes = state.passes.active_count().await?;

    Ok(Json(ReportResponse {
        total_accounts: accounts_by_role.values().sum(),
        accounts_by_role,
        active_passes,
        generated_at: Utc::now(),
    }))
}
