//! Storage layer for the analytics backend.
//!
//! The [`Repository`] trait is the storage contract the rest of the server is
//! written against. Two implementations exist:
//!
//! - [`PgRepository`] - `PostgreSQL` via sqlx, the production backend
//! - [`MemoryRepository`] - in-process maps, used as the test double
//!
//! The contract's central property is upsert-by-Shopify-ID: applying the same
//! external record twice must land on the same row, with the latest mutable
//! field values and an unchanged internal ID. The `PostgreSQL` implementation
//! leans on `ON CONFLICT` for this, which also makes concurrent same-key
//! upserts last-write-wins rather than duplicating rows.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run on startup.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use storepulse_core::{CustomerId, StoreId, SyncEntity, SyncStatus, TenantId, UserId};

use crate::models::{Customer, Order, Product, ShopifyStore, SyncLog, Tenant, User};

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Parameters for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Tenant the user registers under.
    pub tenant_id: TenantId,
    /// Display name.
    pub name: String,
    /// Email address (globally unique).
    pub email: storepulse_core::Email,
    /// Argon2 password hash.
    pub password_hash: String,
}

/// Parameters for connecting (or reconnecting) a store.
#[derive(Clone)]
pub struct StoreUpsert {
    /// Tenant connecting the store.
    pub tenant_id: TenantId,
    /// Shop domain; the natural key for reconnects.
    pub shop_domain: String,
    /// Admin API access token.
    pub access_token: secrecy::SecretString,
    /// Shared secret for webhook verification, if the tenant provides one.
    pub webhook_secret: Option<secrecy::SecretString>,
}

/// Mutable product fields applied on upsert, keyed by `shopify_id`.
#[derive(Debug, Clone)]
pub struct ProductUpsert {
    /// Shopify-assigned ID; the upsert key.
    pub shopify_id: String,
    /// Product title.
    pub title: String,
    /// First-variant price; zero when absent.
    pub price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Mutable customer fields applied on upsert, keyed by `shopify_id`.
#[derive(Debug, Clone)]
pub struct CustomerUpsert {
    /// Shopify-assigned ID; the upsert key.
    pub shopify_id: String,
    /// Email address, if present.
    pub email: Option<String>,
    /// First name, if present.
    pub first_name: Option<String>,
    /// Last name, if present.
    pub last_name: Option<String>,
}

/// Mutable order fields applied on upsert, keyed by `shopify_id`.
#[derive(Debug, Clone)]
pub struct OrderUpsert {
    /// Shopify-assigned ID; the upsert key.
    pub shopify_id: String,
    /// Order total; zero when absent or malformed.
    pub total_amount: Decimal,
    /// ISO 4217 currency code, if present.
    pub currency: Option<String>,
    /// Internal customer link resolved for this application, if any.
    pub customer_id: Option<CustomerId>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// The storage contract defining all database operations.
///
/// Abstracting the storage layer keeps the sync engine, webhook processing,
/// and metrics aggregation testable against an in-memory double, and means
/// no handler reaches for a hidden global connection — the repository is
/// passed explicitly through [`crate::state::AppState`].
#[async_trait]
pub trait Repository: Send + Sync {
    // =========================================================================
    // Health
    // =========================================================================

    /// Verify the backend is reachable (used by the readiness probe).
    async fn ping(&self) -> Result<(), RepositoryError>;

    // =========================================================================
    // Tenants and users
    // =========================================================================

    /// Create a tenant.
    async fn create_tenant(&self, name: &str) -> Result<Tenant, RepositoryError>;

    /// Get a tenant by ID.
    async fn get_tenant(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError>;

    /// Create a user.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError>;

    /// Look up a user by email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Get a user by ID.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    // =========================================================================
    // Stores
    // =========================================================================

    /// Connect a store, or refresh its credentials if the domain is already
    /// registered to the same tenant.
    ///
    /// Returns `RepositoryError::Conflict` if the domain belongs to a
    /// different tenant.
    async fn upsert_store(&self, upsert: StoreUpsert) -> Result<ShopifyStore, RepositoryError>;

    /// Get a store by internal ID.
    async fn get_store(&self, id: StoreId) -> Result<Option<ShopifyStore>, RepositoryError>;

    /// Get a store by shop domain (webhook path).
    async fn get_store_by_domain(
        &self,
        shop_domain: &str,
    ) -> Result<Option<ShopifyStore>, RepositoryError>;

    /// List a tenant's stores, oldest first.
    async fn stores_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ShopifyStore>, RepositoryError>;

    /// The tenant's first connected store, if any (metrics scope resolution).
    async fn first_store_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<ShopifyStore>, RepositoryError>;

    // =========================================================================
    // Synced entities (upsert-by-Shopify-ID)
    // =========================================================================

    /// Insert or update a product keyed by its Shopify ID.
    async fn upsert_product(
        &self,
        store_id: StoreId,
        upsert: ProductUpsert,
    ) -> Result<Product, RepositoryError>;

    /// Insert or update a customer keyed by its Shopify ID.
    async fn upsert_customer(
        &self,
        store_id: StoreId,
        upsert: CustomerUpsert,
    ) -> Result<Customer, RepositoryError>;

    /// Resolve a Shopify customer ID to the locally-synced customer, scoped
    /// to one store. `None` is the expected answer when the customer has not
    /// been synced yet — not an error.
    async fn customer_by_shopify_id(
        &self,
        store_id: StoreId,
        shopify_id: &str,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Insert or update an order keyed by its Shopify ID.
    ///
    /// The customer link is applied on both insert and update; the order's
    /// placement timestamp is set on insert only.
    async fn upsert_order(
        &self,
        store_id: StoreId,
        upsert: OrderUpsert,
    ) -> Result<Order, RepositoryError>;

    // =========================================================================
    // Aggregates (metrics reads)
    // =========================================================================

    /// Number of products synced for a store.
    async fn count_products(&self, store_id: StoreId) -> Result<i64, RepositoryError>;

    /// Number of customers synced for a store.
    async fn count_customers(&self, store_id: StoreId) -> Result<i64, RepositoryError>;

    /// Number of orders synced for a store.
    async fn count_orders(&self, store_id: StoreId) -> Result<i64, RepositoryError>;

    /// Sum of order totals for a store; zero when there are no orders.
    async fn total_revenue(&self, store_id: StoreId) -> Result<Decimal, RepositoryError>;

    /// Orders placed within `[from, to)`, ascending by placement time.
    async fn orders_between(
        &self,
        store_id: StoreId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// Customers ranked by total order spend, descending, up to `limit`.
    /// Orders without a customer link are excluded.
    async fn customer_spend_totals(
        &self,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<(Customer, Decimal)>, RepositoryError>;

    // =========================================================================
    // Sync audit log (append-only)
    // =========================================================================

    /// Append one sync log entry.
    async fn append_sync_log(
        &self,
        store_id: StoreId,
        entity: SyncEntity,
        status: SyncStatus,
        message: &str,
    ) -> Result<SyncLog, RepositoryError>;

    /// Most recent log entries for a store, newest first.
    async fn recent_sync_logs(
        &self,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<SyncLog>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
