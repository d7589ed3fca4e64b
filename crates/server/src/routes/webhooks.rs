//! Shopify webhook route handler.
//!
//! The body is taken as raw bytes: signature verification must run over the
//! exact bytes Shopify sent, before any JSON parsing, so this route never
//! goes through the JSON extractor.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Webhook acknowledgement body.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was received.
    pub received: bool,
}

/// Receive a Shopify webhook.
///
/// Shopify identifies the store and event via headers:
/// `X-Shopify-Shop-Domain`, `X-Shopify-Topic`, and `X-Shopify-Hmac-Sha256`.
#[instrument(skip_all)]
pub async fn shopify(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    let shop_domain = header_str(&headers, "x-shopify-shop-domain").ok_or_else(|| {
        AppError::BadRequest("Webhook is missing the shop domain header".to_string())
    })?;
    let topic = header_str(&headers, "x-shopify-topic").unwrap_or_default();
    let signature = header_str(&headers, "x-shopify-hmac-sha256");

    tracing::info!(shop = %shop_domain, topic = %topic, "webhook received");

    state
        .webhook_processor()
        .process(shop_domain, topic, signature, &body)
        .await?;

    Ok(Json(WebhookResponse { received: true }))
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
