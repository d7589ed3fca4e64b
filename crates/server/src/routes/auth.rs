//! Authentication route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use storepulse_core::{Email, TenantId, UserId};

use crate::auth::{AuthError, hash_password, issue_token, verify_password};
use crate::db::{NewUser, RepositoryError};
use crate::error::AppError;
use crate::state::AppState;

/// Registration payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub tenant_id: TenantId,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The user block of a login response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub tenant_id: TenantId,
}

/// Register a new user under an existing tenant.
#[instrument(skip_all, fields(email = %payload.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Name, email, password, and tenantId are required".to_string(),
        ));
    }

    let email = Email::parse(payload.email.trim())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .repo()
        .get_tenant(payload.tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    let password_hash = hash_password(&payload.password)?;

    let user = state
        .repo()
        .create_user(NewUser {
            tenant_id: payload.tenant_id,
            name: payload.name.trim().to_string(),
            email,
            password_hash,
        })
        .await
        .map_err(|err| match err {
            RepositoryError::Conflict(_) => AppError::Auth(AuthError::UserAlreadyExists),
            other => AppError::Database(other),
        })?;

    tracing::info!(user_id = %user.id, tenant_id = %user.tenant_id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "userId": user.id,
        })),
    ))
}

/// Log in and receive a JWT carrying the tenant scope.
#[instrument(skip_all, fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    // The same error for unknown email and wrong password, so login attempts
    // cannot probe which emails are registered.
    let user = state
        .repo()
        .get_user_by_email(payload.email.trim())
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let token = issue_token(&user, &state.config().jwt_secret)?;

    tracing::info!(user_id = %user.id, "login successful");

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": UserView {
            id: user.id,
            name: user.name,
            email: user.email.to_string(),
            tenant_id: user.tenant_id,
        },
    })))
}
