//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::Repository;
use crate::metrics::MetricsService;
use crate::shopify::ShopifyApi;
use crate::sync::{SyncEngine, WebhookProcessor};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to shared
/// resources. The repository and Shopify client are trait objects passed in
/// explicitly at construction — there is no hidden global handle — so the
/// whole request path can run against test doubles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    repo: Arc<dyn Repository>,
    shopify: Arc<dyn ShopifyApi>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        repo: Arc<dyn Repository>,
        shopify: Arc<dyn ShopifyApi>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                repo,
                shopify,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a handle to the storage layer.
    #[must_use]
    pub fn repo(&self) -> Arc<dyn Repository> {
        Arc::clone(&self.inner.repo)
    }

    /// Get a handle to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> Arc<dyn ShopifyApi> {
        Arc::clone(&self.inner.shopify)
    }

    /// Build a sync engine over this state's storage and Shopify client.
    #[must_use]
    pub fn sync_engine(&self) -> SyncEngine {
        SyncEngine::new(self.repo(), self.shopify())
    }

    /// Build a webhook processor over this state's storage.
    #[must_use]
    pub fn webhook_processor(&self) -> WebhookProcessor {
        WebhookProcessor::new(self.repo())
    }

    /// Build a metrics service over this state's storage.
    #[must_use]
    pub fn metrics(&self) -> MetricsService {
        MetricsService::new(self.repo(), self.inner.config.reporting_offset())
    }
}
