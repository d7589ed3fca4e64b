//! HTTP route handlers for the analytics backend.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (verifies storage)
//!
//! # Tenants
//! POST /tenants                 - Create a tenant (onboarding bootstrap)
//!
//! # Auth
//! POST /auth/register           - Register a user under a tenant
//! POST /auth/login              - Log in, returns a JWT
//!
//! # Stores (requires auth; tenant comes from the token)
//! POST /stores/connect          - Connect or reconnect a Shopify store
//! GET  /stores                  - List the tenant's stores
//!
//! # Sync (requires auth; the store must belong to the tenant)
//! POST /sync/products           - Bulk-sync products
//! POST /sync/customers          - Bulk-sync customers
//! POST /sync/orders             - Bulk-sync orders
//! GET  /sync/logs/{store_id}    - Most recent 50 sync log entries
//!
//! # Metrics (requires auth; store resolved from the tenant)
//! GET  /metrics/summary         - Counts + total revenue
//! GET  /metrics/revenue         - Daily revenue series (?from=&to=, ISO dates)
//! GET  /metrics/top-customers   - Top 5 customers by spend
//!
//! # Webhooks (authenticated by HMAC signature, not JWT)
//! POST /webhooks/shopify        - Shopify webhook receiver (raw body)
//! ```

pub mod auth;
pub mod health;
pub mod metrics;
pub mod stores;
pub mod sync;
pub mod tenants;
pub mod webhooks;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Create the full application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/tenants", post(tenants::create))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/stores/connect", post(stores::connect))
        .route("/stores", get(stores::list))
        .route("/sync/products", post(sync::products))
        .route("/sync/customers", post(sync::customers))
        .route("/sync/orders", post(sync::orders))
        .route("/sync/logs/{store_id}", get(sync::logs))
        .route("/metrics/summary", get(metrics::summary))
        .route("/metrics/revenue", get(metrics::revenue))
        .route("/metrics/top-customers", get(metrics::top_customers))
        .route("/webhooks/shopify", post(webhooks::shopify))
}
