//! Store connection route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use storepulse_core::StoreId;

use crate::db::{RepositoryError, StoreUpsert};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::ShopifyStore;
use crate::state::AppState;

/// Store connection payload.
///
/// The tenant is NOT part of the payload — it comes from the verified token.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectStoreRequest {
    pub shop_domain: String,
    pub access_token: String,
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

/// Store as returned to clients. Credentials never leave the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreView {
    pub id: StoreId,
    pub shop_domain: String,
    pub created_at: DateTime<Utc>,
}

impl From<ShopifyStore> for StoreView {
    fn from(store: ShopifyStore) -> Self {
        Self {
            id: store.id,
            shop_domain: store.shop_domain,
            created_at: store.created_at,
        }
    }
}

/// Connect a Shopify store to the caller's tenant.
///
/// Reconnecting a domain the tenant already owns rotates the credentials in
/// place; a domain owned by another tenant is a conflict.
#[instrument(skip_all, fields(tenant_id = %principal.tenant_id))]
pub async fn connect(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(payload): Json<ConnectStoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    let shop_domain = payload.shop_domain.trim().to_lowercase();
    if shop_domain.is_empty() || payload.access_token.is_empty() {
        return Err(AppError::BadRequest(
            "shopDomain and accessToken are required".to_string(),
        ));
    }

    let store = state
        .repo()
        .upsert_store(StoreUpsert {
            tenant_id: principal.tenant_id,
            shop_domain,
            access_token: SecretString::from(payload.access_token),
            webhook_secret: payload.webhook_secret.map(SecretString::from),
        })
        .await
        .map_err(|err| match err {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Database(other),
        })?;

    tracing::info!(store_id = %store.id, shop = %store.shop_domain, "store connected");

    Ok((StatusCode::CREATED, Json(StoreView::from(store))))
}

/// List the caller's tenant's stores.
#[instrument(skip_all, fields(tenant_id = %principal.tenant_id))]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<StoreView>>, AppError> {
    let stores = state
        .repo()
        .stores_for_tenant(principal.tenant_id)
        .await?;

    Ok(Json(stores.into_iter().map(StoreView::from).collect()))
}
