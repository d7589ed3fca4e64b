//! Store synchronization: bulk pulls and webhook pushes.
//!
//! Both paths funnel order writes through [`apply_order`], so the
//! upsert-by-Shopify-ID contract and the customer-link resolution behave
//! identically whether an order arrives via `orders.json` or an
//! `orders/create` webhook.

pub mod engine;
pub mod webhook;

pub use engine::SyncEngine;
pub use webhook::{WebhookAck, WebhookError, WebhookProcessor};

use chrono::Utc;
use thiserror::Error;

use storepulse_core::{StoreId, parse_money};

use crate::db::{OrderUpsert, Repository, RepositoryError};
use crate::models::Order;
use crate::shopify::{OrderPayload, ShopifyError};

/// Errors that can occur during a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The requested store does not exist.
    #[error("store not found")]
    StoreNotFound,

    /// The Shopify Admin API call failed; nothing was processed.
    #[error(transparent)]
    Shopify(#[from] ShopifyError),

    /// A storage write failed mid-run.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Apply one order payload: resolve the customer link, then upsert.
///
/// The customer is re-resolved on every application — not just on insert —
/// because the customer may have been synced since the order was last seen.
/// An unresolvable customer yields a null link, which is valid domain state.
pub(crate) async fn apply_order(
    repo: &dyn Repository,
    store_id: StoreId,
    payload: &OrderPayload,
) -> Result<Order, RepositoryError> {
    let customer_id = match &payload.customer {
        Some(customer) => repo
            .customer_by_shopify_id(store_id, &customer.id.to_string())
            .await?
            .map(|c| c.id),
        None => None,
    };

    repo.upsert_order(
        store_id,
        OrderUpsert {
            shopify_id: payload.id.to_string(),
            total_amount: parse_money(payload.total_price.as_deref()),
            currency: payload.currency.clone(),
            customer_id,
            created_at: payload.created_at.unwrap_or_else(Utc::now),
        },
    )
    .await
}
