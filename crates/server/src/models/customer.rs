//! Synced customer domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storepulse_core::{CustomerId, StoreId};

/// A customer mirrored from a connected Shopify store.
///
/// Orders reference customers by the internal [`CustomerId`], never by the
/// Shopify ID directly; the mapping between the two is the identity
/// reconciliation step of order syncing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique internal customer ID.
    pub id: CustomerId,
    /// Store this customer belongs to.
    pub store_id: StoreId,
    /// Shopify-assigned ID; the upsert key, immutable once set.
    pub shopify_id: String,
    /// Email address, if Shopify has one on file.
    pub email: Option<String>,
    /// First name, if present.
    pub first_name: Option<String>,
    /// Last name, if present.
    pub last_name: Option<String>,
    /// When the row was first created.
    pub created_at: DateTime<Utc>,
    /// When the row was last touched by a sync.
    pub updated_at: DateTime<Utc>,
}
