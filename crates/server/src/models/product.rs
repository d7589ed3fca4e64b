//! Synced product domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use storepulse_core::{ProductId, StoreId};

/// A product mirrored from a connected Shopify store.
///
/// Created and updated only by the sync engine; there is no deletion path —
/// the table mirrors the external system's eventual state.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique internal product ID.
    pub id: ProductId,
    /// Store this product belongs to.
    pub store_id: StoreId,
    /// Shopify-assigned ID; the upsert key, immutable once set.
    pub shopify_id: String,
    /// Product title.
    pub title: String,
    /// Price of the first variant; zero when Shopify omits it.
    pub price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// When the row was first created.
    pub created_at: DateTime<Utc>,
    /// When the row was last touched by a sync.
    pub updated_at: DateTime<Utc>,
}
