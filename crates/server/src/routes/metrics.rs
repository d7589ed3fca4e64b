//! Metrics route handlers.
//!
//! The store is always resolved from the authenticated tenant — never from a
//! client-supplied identifier. A caller can only ever see its own store's
//! numbers, whatever it puts in the request.

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::metrics::{RevenuePoint, StoreSummary, TopCustomer};
use crate::middleware::{CurrentUser, auth::Principal};
use crate::models::ShopifyStore;
use crate::state::AppState;

/// Optional date range for the revenue series, as ISO dates (`2024-03-10`)
/// interpreted in the reporting timezone.
#[derive(Debug, Deserialize)]
pub struct RevenueParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Counts and total revenue for the tenant's store.
#[instrument(skip(state, principal), fields(tenant_id = %principal.0.tenant_id))]
pub async fn summary(
    State(state): State<AppState>,
    principal: CurrentUser,
) -> Result<Json<StoreSummary>, AppError> {
    let store = tenant_store(&state, &principal.0).await?;
    let summary = state.metrics().summary(store.id).await?;
    Ok(Json(summary))
}

/// Daily revenue series for the tenant's store.
#[instrument(skip(state, principal), fields(tenant_id = %principal.0.tenant_id))]
pub async fn revenue(
    State(state): State<AppState>,
    principal: CurrentUser,
    Query(params): Query<RevenueParams>,
) -> Result<Json<Vec<RevenuePoint>>, AppError> {
    let store = tenant_store(&state, &principal.0).await?;

    let offset = state.config().reporting_offset();
    let from = params.from.and_then(|d| day_start_utc(d, offset));
    // `to` is inclusive in the query string; the storage read is half-open,
    // so advance to the start of the following day.
    let to = params
        .to
        .and_then(|d| d.checked_add_days(Days::new(1)))
        .and_then(|d| day_start_utc(d, offset));

    let series = state
        .metrics()
        .revenue_over_time(store.id, from, to)
        .await?;
    Ok(Json(series))
}

/// Top customers for the tenant's store.
#[instrument(skip(state, principal), fields(tenant_id = %principal.0.tenant_id))]
pub async fn top_customers(
    State(state): State<AppState>,
    principal: CurrentUser,
) -> Result<Json<Vec<TopCustomer>>, AppError> {
    let store = tenant_store(&state, &principal.0).await?;
    let top = state.metrics().top_customers(store.id).await?;
    Ok(Json(top))
}

/// Resolve the caller's store from its tenant.
async fn tenant_store(state: &AppState, principal: &Principal) -> Result<ShopifyStore, AppError> {
    state
        .repo()
        .first_store_for_tenant(principal.tenant_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No Shopify store found for this tenant".to_string())
        })
}

/// Midnight of `date` in the reporting timezone, as a UTC instant.
fn day_start_utc(date: NaiveDate, offset: chrono::FixedOffset) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.and_local_timezone(offset).single())
        .map(|dt| dt.with_timezone(&Utc))
}
