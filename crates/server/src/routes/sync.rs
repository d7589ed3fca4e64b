//! Sync trigger and audit log route handlers.

use axum::extract::{Path, State};
use axum::{Json, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use storepulse_core::{StoreId, SyncEntity};

use crate::error::AppError;
use crate::middleware::{CurrentUser, auth::Principal};
use crate::models::ShopifyStore;
use crate::state::AppState;

/// Page size for the audit log read.
const SYNC_LOG_PAGE_SIZE: i64 = 50;

/// Sync trigger payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub store_id: StoreId,
}

/// Trigger a product sync.
#[instrument(skip(state, principal), fields(tenant_id = %principal.0.tenant_id))]
pub async fn products(
    State(state): State<AppState>,
    principal: CurrentUser,
    Json(payload): Json<SyncRequest>,
) -> Result<impl IntoResponse, AppError> {
    run_sync(&state, &principal.0, payload.store_id, SyncEntity::Products).await
}

/// Trigger a customer sync.
#[instrument(skip(state, principal), fields(tenant_id = %principal.0.tenant_id))]
pub async fn customers(
    State(state): State<AppState>,
    principal: CurrentUser,
    Json(payload): Json<SyncRequest>,
) -> Result<impl IntoResponse, AppError> {
    run_sync(&state, &principal.0, payload.store_id, SyncEntity::Customers).await
}

/// Trigger an order sync.
#[instrument(skip(state, principal), fields(tenant_id = %principal.0.tenant_id))]
pub async fn orders(
    State(state): State<AppState>,
    principal: CurrentUser,
    Json(payload): Json<SyncRequest>,
) -> Result<impl IntoResponse, AppError> {
    run_sync(&state, &principal.0, payload.store_id, SyncEntity::Orders).await
}

/// Fetch the most recent sync log entries for a store.
#[instrument(skip(state, principal), fields(tenant_id = %principal.0.tenant_id))]
pub async fn logs(
    State(state): State<AppState>,
    principal: CurrentUser,
    Path(store_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let store = owned_store(&state, &principal.0, StoreId::from(store_id)).await?;

    let logs = state
        .repo()
        .recent_sync_logs(store.id, SYNC_LOG_PAGE_SIZE)
        .await?;

    Ok(Json(logs))
}

/// Run one sync and shape the response.
async fn run_sync(
    state: &AppState,
    principal: &Principal,
    store_id: StoreId,
    entity: SyncEntity,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = owned_store(state, principal, store_id).await?;

    let count = state.sync_engine().sync(store.id, entity).await?;

    let message = if count == 0 {
        format!("Shopify store has no {} to sync.", entity.noun())
    } else {
        format!("Synced {count} {} successfully.", entity.noun())
    };

    Ok(Json(json!({ "message": message, "count": count })))
}

/// Resolve a store and confirm the caller's tenant owns it.
///
/// An existing store owned by another tenant is reported as not-found, so
/// callers cannot probe which store IDs exist.
async fn owned_store(
    state: &AppState,
    principal: &Principal,
    store_id: StoreId,
) -> Result<ShopifyStore, AppError> {
    state
        .repo()
        .get_store(store_id)
        .await?
        .filter(|store| store.tenant_id == principal.tenant_id)
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))
}
