//! Tenant onboarding route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Tenant creation payload.
#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub name: String,
}

/// Tenant creation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantResponse {
    pub id: storepulse_core::TenantId,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Create a tenant.
///
/// Deliberately unauthenticated: it is the first step of onboarding, before
/// any user exists to authenticate as.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }

    let tenant = state.repo().create_tenant(name).await?;
    tracing::info!(tenant_id = %tenant.id, "tenant created");

    Ok((
        StatusCode::CREATED,
        Json(TenantResponse {
            id: tenant.id,
            name: tenant.name,
            created_at: tenant.created_at,
        }),
    ))
}
