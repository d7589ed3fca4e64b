//! Shopify Admin API client.
//!
//! # Architecture
//!
//! - One REST GET per sync call against the store's own domain
//!   (`https://{shop}/admin/api/{version}/{resource}.json`)
//! - The access token travels in the `X-Shopify-Access-Token` header and is
//!   never logged; stores hold it as a `SecretString`
//! - No retry logic here - retry policy belongs to the caller
//! - The [`ShopifyApi`] trait is what the sync engine consumes, so tests can
//!   substitute a scripted implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use storepulse_server::shopify::{AdminClient, ShopifyApi};
//!
//! let client = AdminClient::new(&config.shopify_api_version)?;
//! let products = client.fetch_products(&store).await?;
//! ```

mod client;
pub mod types;

pub use client::AdminClient;
pub use types::{CustomerPayload, OrderPayload, ProductPayload, VariantPayload};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::ShopifyStore;

/// Errors that can occur when calling the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// The access token was rejected (401/403).
    #[error("Shopify rejected the access token: {0}")]
    Auth(String),

    /// The requested resource does not exist (404).
    #[error("Shopify resource not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify (429).
    #[error("rate limited by Shopify")]
    RateLimited,

    /// Network-level failure: connect, timeout, or body read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other non-2xx response, with the body Shopify returned.
    #[error("Shopify API error: {status} - {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },
}

/// Read access to a store's Shopify data, as consumed by the sync engine.
#[async_trait]
pub trait ShopifyApi: Send + Sync {
    /// Fetch the store's products.
    async fn fetch_products(&self, store: &ShopifyStore)
    -> Result<Vec<ProductPayload>, ShopifyError>;

    /// Fetch the store's customers.
    async fn fetch_customers(
        &self,
        store: &ShopifyStore,
    ) -> Result<Vec<CustomerPayload>, ShopifyError>;

    /// Fetch the store's orders, regardless of status.
    async fn fetch_orders(&self, store: &ShopifyStore) -> Result<Vec<OrderPayload>, ShopifyError>;
}
