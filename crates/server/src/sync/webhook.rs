//! Webhook ingestion.
//!
//! Shopify pushes single-entity events; each is processed independently, in
//! isolation — one bad event must never take the ingesting process down.
//!
//! Signature verification runs over the EXACT raw request bytes, before the
//! payload is parsed as structured data. Shopify signs the body with
//! HMAC-SHA256 keyed by the store's shared secret and sends the
//! base64-encoded digest in `X-Shopify-Hmac-Sha256`. Stores without a
//! configured secret skip verification with a warning.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

use crate::db::{Repository, RepositoryError};
use crate::shopify::OrderPayload;

use super::apply_order;

type HmacSha256 = Hmac<Sha256>;

/// The topic this processor mutates state for. Everything else is
/// acknowledged without processing, so Shopify does not retry topics we have
/// not implemented yet.
const TOPIC_ORDER_CREATED: &str = "orders/create";

/// Errors that can occur while ingesting a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No store is registered for the sending shop domain.
    #[error("no store registered for shop domain {0}")]
    UnknownStore(String),

    /// The store requires signed webhooks but no signature header arrived.
    #[error("missing webhook signature")]
    MissingSignature,

    /// The signature did not match the raw body.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// The body could not be parsed for a handled topic.
    #[error("malformed webhook payload: {0}")]
    Payload(String),

    /// A storage write failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// How an accepted webhook was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAck {
    /// The event mutated state.
    Processed,
    /// The topic is not handled; acknowledged without mutation.
    Ignored,
}

/// Applies incremental updates pushed by Shopify.
#[derive(Clone)]
pub struct WebhookProcessor {
    repo: Arc<dyn Repository>,
}

impl WebhookProcessor {
    /// Create a processor over the given storage.
    #[must_use]
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Process one webhook delivery.
    ///
    /// # Errors
    ///
    /// - `WebhookError::UnknownStore` if the shop domain is not registered
    /// - `WebhookError::MissingSignature` / `InvalidSignature` if the store
    ///   has a webhook secret and the delivery fails verification
    /// - `WebhookError::Payload` if a handled topic's body does not parse
    /// - `WebhookError::Repository` if the upsert fails
    pub async fn process(
        &self,
        shop_domain: &str,
        topic: &str,
        signature: Option<&str>,
        raw_body: &[u8],
    ) -> Result<WebhookAck, WebhookError> {
        let store = self
            .repo
            .get_store_by_domain(shop_domain)
            .await?
            .ok_or_else(|| WebhookError::UnknownStore(shop_domain.to_string()))?;

        // Verification must precede any parsing of the body.
        if let Some(secret) = &store.webhook_secret {
            let provided = signature.ok_or(WebhookError::MissingSignature)?;
            if !signature_matches(secret, raw_body, provided) {
                return Err(WebhookError::InvalidSignature);
            }
        } else {
            tracing::warn!(
                shop = %shop_domain,
                "store has no webhook secret configured - skipping signature verification"
            );
        }

        match topic {
            TOPIC_ORDER_CREATED => {
                let payload: OrderPayload = serde_json::from_slice(raw_body)
                    .map_err(|e| WebhookError::Payload(e.to_string()))?;

                let order = apply_order(self.repo.as_ref(), store.id, &payload).await?;
                tracing::info!(
                    shop = %shop_domain,
                    order_id = %order.id,
                    shopify_order_id = %order.shopify_id,
                    "processed order webhook"
                );
                Ok(WebhookAck::Processed)
            }
            other => {
                tracing::debug!(shop = %shop_domain, topic = %other, "unhandled webhook topic");
                Ok(WebhookAck::Ignored)
            }
        }
    }
}

/// Verify the base64-encoded HMAC-SHA256 of the raw body.
fn signature_matches(secret: &SecretString, body: &[u8], provided: &str) -> bool {
    // HMAC-SHA256 accepts keys of any size, so this only fails if the
    // implementation itself is broken.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(body);

    let computed = BASE64.encode(mac.finalize().into_bytes());
    constant_time_eq(&computed, provided)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
