//! `PostgreSQL` implementation of the storage contract.
//!
//! Upserts use `ON CONFLICT` against the unique `shopify_id` / `shop_domain`
//! indexes; those constraints carry the idempotency contract, so the queries
//! never check-then-insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use storepulse_core::{
    CustomerId, Email, OrderId, ProductId, StoreId, SyncEntity, SyncLogId, SyncStatus, TenantId,
    UserId,
};

use crate::models::{Customer, Order, Product, ShopifyStore, SyncLog, Tenant, User};

use super::{
    CustomerUpsert, NewUser, OrderUpsert, ProductUpsert, Repository, RepositoryError, StoreUpsert,
};

/// `PostgreSQL`-backed repository.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a repository over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// =============================================================================
// Row types
// =============================================================================

/// Internal row type for tables whose domain type carries secrets or enums.
#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    id: TenantId,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    tenant_id: TenantId,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    tenant_id: TenantId,
    shop_domain: String,
    access_token: String,
    webhook_secret: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for ShopifyStore {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            tenant_id: row.tenant_id,
            shop_domain: row.shop_domain,
            access_token: SecretString::from(row.access_token),
            webhook_secret: row.webhook_secret.map(SecretString::from),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SyncLogRow {
    id: SyncLogId,
    store_id: StoreId,
    entity: String,
    status: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SyncLogRow> for SyncLog {
    type Error = RepositoryError;

    fn try_from(row: SyncLogRow) -> Result<Self, Self::Error> {
        let entity = SyncEntity::parse(&row.entity).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("unknown sync entity: {}", row.entity))
        })?;
        let status = SyncStatus::parse(&row.status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("unknown sync status: {}", row.status))
        })?;

        Ok(Self {
            id: row.id,
            store_id: row.store_id,
            entity,
            status,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CustomerSpendRow {
    id: CustomerId,
    store_id: StoreId,
    shopify_id: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    total_spent: Decimal,
}

/// Translate a unique-constraint violation into `RepositoryError::Conflict`.
fn map_insert_error(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(what.to_string());
        }
    }
    RepositoryError::Database(err)
}

// =============================================================================
// Repository implementation
// =============================================================================

#[async_trait]
impl Repository for PgRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn create_tenant(&self, name: &str) -> Result<Tenant, RepositoryError> {
        let row = sqlx::query_as::<_, TenantRow>(
            r"
            INSERT INTO tenants (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at
            ",
        )
        .bind(TenantId::generate())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_tenant(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError> {
        let row = sqlx::query_as::<_, TenantRow>(
            "SELECT id, name, created_at FROM tenants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Tenant::from))
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (id, tenant_id, name, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, tenant_id, name, email, password_hash, created_at
            ",
        )
        .bind(UserId::generate())
        .bind(new.tenant_id)
        .bind(&new.name)
        .bind(new.email.as_str())
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "email already registered"))?;

        row.try_into()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, tenant_id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, tenant_id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn upsert_store(&self, upsert: StoreUpsert) -> Result<ShopifyStore, RepositoryError> {
        // The conditional update means a domain owned by another tenant
        // produces no row, which is reported as a conflict rather than
        // silently rebinding the store.
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            INSERT INTO shopify_stores (id, tenant_id, shop_domain, access_token, webhook_secret)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (shop_domain) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                webhook_secret = EXCLUDED.webhook_secret
            WHERE shopify_stores.tenant_id = EXCLUDED.tenant_id
            RETURNING id, tenant_id, shop_domain, access_token, webhook_secret, created_at
            ",
        )
        .bind(StoreId::generate())
        .bind(upsert.tenant_id)
        .bind(&upsert.shop_domain)
        .bind(upsert.access_token.expose_secret())
        .bind(upsert.webhook_secret.as_ref().map(ExposeSecret::expose_secret))
        .fetch_optional(&self.pool)
        .await?;

        row.map(ShopifyStore::from).ok_or_else(|| {
            RepositoryError::Conflict("shop domain is connected to another tenant".to_string())
        })
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<ShopifyStore>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, tenant_id, shop_domain, access_token, webhook_secret, created_at
            FROM shopify_stores
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShopifyStore::from))
    }

    async fn get_store_by_domain(
        &self,
        shop_domain: &str,
    ) -> Result<Option<ShopifyStore>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, tenant_id, shop_domain, access_token, webhook_secret, created_at
            FROM shopify_stores
            WHERE shop_domain = $1
            ",
        )
        .bind(shop_domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShopifyStore::from))
    }

    async fn stores_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ShopifyStore>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, tenant_id, shop_domain, access_token, webhook_secret, created_at
            FROM shopify_stores
            WHERE tenant_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShopifyStore::from).collect())
    }

    async fn first_store_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<ShopifyStore>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, tenant_id, shop_domain, access_token, webhook_secret, created_at
            FROM shopify_stores
            WHERE tenant_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            ",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShopifyStore::from))
    }

    async fn upsert_product(
        &self,
        store_id: StoreId,
        upsert: ProductUpsert,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (id, store_id, shopify_id, title, price, currency)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (shopify_id) DO UPDATE SET
                title = EXCLUDED.title,
                price = EXCLUDED.price,
                updated_at = now()
            RETURNING id, store_id, shopify_id, title, price, currency, created_at, updated_at
            ",
        )
        .bind(ProductId::generate())
        .bind(store_id)
        .bind(&upsert.shopify_id)
        .bind(&upsert.title)
        .bind(upsert.price)
        .bind(&upsert.currency)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn upsert_customer(
        &self,
        store_id: StoreId,
        upsert: CustomerUpsert,
    ) -> Result<Customer, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"
            INSERT INTO customers (id, store_id, shopify_id, email, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (shopify_id) DO UPDATE SET
                email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                updated_at = now()
            RETURNING id, store_id, shopify_id, email, first_name, last_name,
                      created_at, updated_at
            ",
        )
        .bind(CustomerId::generate())
        .bind(store_id)
        .bind(&upsert.shopify_id)
        .bind(&upsert.email)
        .bind(&upsert.first_name)
        .bind(&upsert.last_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn customer_by_shopify_id(
        &self,
        store_id: StoreId,
        shopify_id: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"
            SELECT id, store_id, shopify_id, email, first_name, last_name,
                   created_at, updated_at
            FROM customers
            WHERE store_id = $1 AND shopify_id = $2
            ",
        )
        .bind(store_id)
        .bind(shopify_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn upsert_order(
        &self,
        store_id: StoreId,
        upsert: OrderUpsert,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO orders (id, store_id, customer_id, shopify_id, total_amount,
                                currency, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (shopify_id) DO UPDATE SET
                total_amount = EXCLUDED.total_amount,
                currency = EXCLUDED.currency,
                customer_id = EXCLUDED.customer_id,
                updated_at = now()
            RETURNING id, store_id, customer_id, shopify_id, total_amount, currency,
                      created_at, updated_at
            ",
        )
        .bind(OrderId::generate())
        .bind(store_id)
        .bind(upsert.customer_id)
        .bind(&upsert.shopify_id)
        .bind(upsert.total_amount)
        .bind(&upsert.currency)
        .bind(upsert.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    async fn count_products(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE store_id = $1",
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_customers(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM customers WHERE store_id = $1",
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_orders(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE store_id = $1")
                .bind(store_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn total_revenue(&self, store_id: StoreId) -> Result<Decimal, RepositoryError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(total_amount), 0) FROM orders WHERE store_id = $1",
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn orders_between(
        &self,
        store_id: StoreId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT id, store_id, customer_id, shopify_id, total_amount, currency,
                   created_at, updated_at
            FROM orders
            WHERE store_id = $1 AND created_at >= $2 AND created_at < $3
            ORDER BY created_at ASC
            ",
        )
        .bind(store_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    async fn customer_spend_totals(
        &self,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<(Customer, Decimal)>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomerSpendRow>(
            r"
            SELECT c.id, c.store_id, c.shopify_id, c.email, c.first_name, c.last_name,
                   c.created_at, c.updated_at, totals.total_spent
            FROM (
                SELECT customer_id, SUM(total_amount) AS total_spent
                FROM orders
                WHERE store_id = $1 AND customer_id IS NOT NULL
                GROUP BY customer_id
                ORDER BY total_spent DESC
                LIMIT $2
            ) totals
            JOIN customers c ON c.id = totals.customer_id
            ORDER BY totals.total_spent DESC
            ",
        )
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    Customer {
                        id: row.id,
                        store_id: row.store_id,
                        shopify_id: row.shopify_id,
                        email: row.email,
                        first_name: row.first_name,
                        last_name: row.last_name,
                        created_at: row.created_at,
                        updated_at: row.updated_at,
                    },
                    row.total_spent,
                )
            })
            .collect())
    }

    async fn append_sync_log(
        &self,
        store_id: StoreId,
        entity: SyncEntity,
        status: SyncStatus,
        message: &str,
    ) -> Result<SyncLog, RepositoryError> {
        let row = sqlx::query_as::<_, SyncLogRow>(
            r"
            INSERT INTO sync_logs (id, store_id, entity, status, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, store_id, entity, status, message, created_at
            ",
        )
        .bind(SyncLogId::generate())
        .bind(store_id)
        .bind(entity.as_str())
        .bind(status.as_str())
        .bind(message)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn recent_sync_logs(
        &self,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<SyncLog>, RepositoryError> {
        let rows = sqlx::query_as::<_, SyncLogRow>(
            r"
            SELECT id, store_id, entity, status, message, created_at
            FROM sync_logs
            WHERE store_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(store_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SyncLog::try_from).collect()
    }
}
