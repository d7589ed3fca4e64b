//! Synced order domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use storepulse_core::{CustomerId, OrderId, StoreId};

/// An order mirrored from a connected Shopify store.
///
/// The customer link is nullable: Shopify orders may carry no customer at
/// all, or reference one that has not been synced yet. Re-applying the order
/// after the customer arrives resolves the link.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique internal order ID.
    pub id: OrderId,
    /// Store this order belongs to.
    pub store_id: StoreId,
    /// Internal ID of the linked customer, when resolvable.
    pub customer_id: Option<CustomerId>,
    /// Shopify-assigned ID; the upsert key, immutable once set.
    pub shopify_id: String,
    /// Order total; zero when Shopify omits or mangles the amount.
    pub total_amount: Decimal,
    /// ISO 4217 currency code, if present in the payload.
    pub currency: Option<String>,
    /// When the order was placed (from the Shopify payload).
    pub created_at: DateTime<Utc>,
    /// When the row was last touched by a sync or webhook.
    pub updated_at: DateTime<Utc>,
}
