//! Connected Shopify store domain type.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

use storepulse_core::{StoreId, TenantId};

/// A Shopify store connected to a tenant.
///
/// The shop domain is globally unique and acts as the natural key when a
/// tenant reconnects a store: the credential is updated in place rather than
/// creating a duplicate row.
///
/// Implements `Debug` manually to redact the access token and webhook secret.
#[derive(Clone)]
pub struct ShopifyStore {
    /// Unique internal store ID.
    pub id: StoreId,
    /// Tenant that owns this store.
    pub tenant_id: TenantId,
    /// Shop domain (e.g., your-store.myshopify.com).
    pub shop_domain: String,
    /// Admin API access token (HIGH PRIVILEGE - redacted in debug output).
    pub access_token: SecretString,
    /// Shared secret for webhook signature verification, if configured.
    pub webhook_secret: Option<SecretString>,
    /// When the store was first connected.
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for ShopifyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStore")
            .field("id", &self.id)
            .field("tenant_id", &self.tenant_id)
            .field("shop_domain", &self.shop_domain)
            .field("access_token", &"[REDACTED]")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("created_at", &self.created_at)
            .finish()
    }
}
