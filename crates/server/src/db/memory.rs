//! In-memory implementation of the storage contract.
//!
//! Backs the test harnesses so the sync engine, webhook processing, and
//! metrics aggregation can be exercised without a live `PostgreSQL` instance.
//! Semantics mirror the `PostgreSQL` implementation: upserts are keyed by
//! `shopify_id`, store domains are unique, and the sync log is append-only.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use storepulse_core::{
    CustomerId, OrderId, ProductId, StoreId, SyncEntity, SyncLogId, SyncStatus, TenantId, UserId,
};

use crate::models::{Customer, Order, Product, ShopifyStore, SyncLog, Tenant, User};

use super::{
    CustomerUpsert, NewUser, OrderUpsert, ProductUpsert, Repository, RepositoryError, StoreUpsert,
};

#[derive(Default)]
struct Inner {
    tenants: HashMap<TenantId, Tenant>,
    users: Vec<User>,
    stores: Vec<ShopifyStore>,
    // Vecs keep insertion order, which gives ranked reads a stable tie order.
    products: Vec<Product>,
    customers: Vec<Customer>,
    orders: Vec<Order>,
    sync_logs: Vec<SyncLog>,
}

/// In-process repository used as the test double.
#[derive(Default)]
pub struct MemoryRepository {
    inner: RwLock<Inner>,
}

impl MemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn create_tenant(&self, name: &str) -> Result<Tenant, RepositoryError> {
        let tenant = Tenant {
            id: TenantId::generate(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        self.inner
            .write()
            .await
            .tenants
            .insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn get_tenant(&self, id: TenantId) -> Result<Option<Tenant>, RepositoryError> {
        Ok(self.inner.read().await.tenants.get(&id).cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;

        if inner
            .users
            .iter()
            .any(|u| u.email.as_str() == new.email.as_str())
        {
            return Err(RepositoryError::Conflict(
                "email already registered".to_string(),
            ));
        }

        let user = User {
            id: UserId::generate(),
            tenant_id: new.tenant_id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn upsert_store(&self, upsert: StoreUpsert) -> Result<ShopifyStore, RepositoryError> {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner
            .stores
            .iter_mut()
            .find(|s| s.shop_domain == upsert.shop_domain)
        {
            if existing.tenant_id != upsert.tenant_id {
                return Err(RepositoryError::Conflict(
                    "shop domain is connected to another tenant".to_string(),
                ));
            }
            existing.access_token = upsert.access_token;
            existing.webhook_secret = upsert.webhook_secret;
            return Ok(existing.clone());
        }

        let store = ShopifyStore {
            id: StoreId::generate(),
            tenant_id: upsert.tenant_id,
            shop_domain: upsert.shop_domain,
            access_token: upsert.access_token,
            webhook_secret: upsert.webhook_secret,
            created_at: Utc::now(),
        };
        inner.stores.push(store.clone());
        Ok(store)
    }

    async fn get_store(&self, id: StoreId) -> Result<Option<ShopifyStore>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .stores
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn get_store_by_domain(
        &self,
        shop_domain: &str,
    ) -> Result<Option<ShopifyStore>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .stores
            .iter()
            .find(|s| s.shop_domain == shop_domain)
            .cloned())
    }

    async fn stores_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Vec<ShopifyStore>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .stores
            .iter()
            .filter(|s| s.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn first_store_for_tenant(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<ShopifyStore>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .stores
            .iter()
            .find(|s| s.tenant_id == tenant_id)
            .cloned())
    }

    async fn upsert_product(
        &self,
        store_id: StoreId,
        upsert: ProductUpsert,
    ) -> Result<Product, RepositoryError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        if let Some(existing) = inner
            .products
            .iter_mut()
            .find(|p| p.shopify_id == upsert.shopify_id)
        {
            existing.title = upsert.title;
            existing.price = upsert.price;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let product = Product {
            id: ProductId::generate(),
            store_id,
            shopify_id: upsert.shopify_id,
            title: upsert.title,
            price: upsert.price,
            currency: upsert.currency,
            created_at: now,
            updated_at: now,
        };
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn upsert_customer(
        &self,
        store_id: StoreId,
        upsert: CustomerUpsert,
    ) -> Result<Customer, RepositoryError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        if let Some(existing) = inner
            .customers
            .iter_mut()
            .find(|c| c.shopify_id == upsert.shopify_id)
        {
            existing.email = upsert.email;
            existing.first_name = upsert.first_name;
            existing.last_name = upsert.last_name;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let customer = Customer {
            id: CustomerId::generate(),
            store_id,
            shopify_id: upsert.shopify_id,
            email: upsert.email,
            first_name: upsert.first_name,
            last_name: upsert.last_name,
            created_at: now,
            updated_at: now,
        };
        inner.customers.push(customer.clone());
        Ok(customer)
    }

    async fn customer_by_shopify_id(
        &self,
        store_id: StoreId,
        shopify_id: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .customers
            .iter()
            .find(|c| c.store_id == store_id && c.shopify_id == shopify_id)
            .cloned())
    }

    async fn upsert_order(
        &self,
        store_id: StoreId,
        upsert: OrderUpsert,
    ) -> Result<Order, RepositoryError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        if let Some(existing) = inner
            .orders
            .iter_mut()
            .find(|o| o.shopify_id == upsert.shopify_id)
        {
            existing.total_amount = upsert.total_amount;
            existing.currency = upsert.currency;
            existing.customer_id = upsert.customer_id;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let order = Order {
            id: OrderId::generate(),
            store_id,
            customer_id: upsert.customer_id,
            shopify_id: upsert.shopify_id,
            total_amount: upsert.total_amount,
            currency: upsert.currency,
            created_at: upsert.created_at,
            updated_at: now,
        };
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn count_products(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        Ok(count_for(&self.inner.read().await.products, |p: &Product| {
            p.store_id == store_id
        }))
    }

    async fn count_customers(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        Ok(count_for(
            &self.inner.read().await.customers,
            |c: &Customer| c.store_id == store_id,
        ))
    }

    async fn count_orders(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        Ok(count_for(&self.inner.read().await.orders, |o: &Order| {
            o.store_id == store_id
        }))
    }

    async fn total_revenue(&self, store_id: StoreId) -> Result<Decimal, RepositoryError> {
        Ok(self
            .inner
            .read()
            .await
            .orders
            .iter()
            .filter(|o| o.store_id == store_id)
            .map(|o| o.total_amount)
            .sum())
    }

    async fn orders_between(
        &self,
        store_id: StoreId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .inner
            .read()
            .await
            .orders
            .iter()
            .filter(|o| o.store_id == store_id && o.created_at >= from && o.created_at < to)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn customer_spend_totals(
        &self,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<(Customer, Decimal)>, RepositoryError> {
        let inner = self.inner.read().await;

        let mut totals: HashMap<CustomerId, Decimal> = HashMap::new();
        for order in inner.orders.iter().filter(|o| o.store_id == store_id) {
            if let Some(customer_id) = order.customer_id {
                *totals.entry(customer_id).or_default() += order.total_amount;
            }
        }

        // Walk customers in insertion order so ties stay stable, then rank.
        let mut ranked: Vec<(Customer, Decimal)> = inner
            .customers
            .iter()
            .filter(|c| c.store_id == store_id)
            .filter_map(|c| totals.get(&c.id).map(|total| (c.clone(), *total)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(ranked)
    }

    async fn append_sync_log(
        &self,
        store_id: StoreId,
        entity: SyncEntity,
        status: SyncStatus,
        message: &str,
    ) -> Result<SyncLog, RepositoryError> {
        let log = SyncLog {
            id: SyncLogId::generate(),
            store_id,
            entity,
            status,
            message: message.to_string(),
            created_at: Utc::now(),
        };

        self.inner.write().await.sync_logs.push(log.clone());
        Ok(log)
    }

    async fn recent_sync_logs(
        &self,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<SyncLog>, RepositoryError> {
        // Entries are appended chronologically; newest-first is reverse order.
        Ok(self
            .inner
            .read()
            .await
            .sync_logs
            .iter()
            .rev()
            .filter(|l| l.store_id == store_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}

fn count_for<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> i64 {
    i64::try_from(items.iter().filter(|i| predicate(i)).count()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use storepulse_core::Email;

    use super::*;

    async fn seeded_store(repo: &MemoryRepository) -> ShopifyStore {
        let tenant = repo.create_tenant("Acme").await.unwrap();
        repo.upsert_store(StoreUpsert {
            tenant_id: tenant.id,
            shop_domain: "acme.myshopify.com".to_string(),
            access_token: SecretString::from("shpat_token"),
            webhook_secret: None,
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn product_upsert_is_idempotent() {
        let repo = MemoryRepository::new();
        let store = seeded_store(&repo).await;

        let first = repo
            .upsert_product(
                store.id,
                ProductUpsert {
                    shopify_id: "1001".to_string(),
                    title: "Mug".to_string(),
                    price: Decimal::new(1200, 2),
                    currency: "USD".to_string(),
                },
            )
            .await
            .unwrap();

        let second = repo
            .upsert_product(
                store.id,
                ProductUpsert {
                    shopify_id: "1001".to_string(),
                    title: "Mug (large)".to_string(),
                    price: Decimal::new(1500, 2),
                    currency: "USD".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.title, "Mug (large)");
        assert_eq!(second.price, Decimal::new(1500, 2));
        assert_eq!(repo.count_products(store.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn store_reconnect_updates_credentials_in_place() {
        let repo = MemoryRepository::new();
        let store = seeded_store(&repo).await;

        let reconnected = repo
            .upsert_store(StoreUpsert {
                tenant_id: store.tenant_id,
                shop_domain: "acme.myshopify.com".to_string(),
                access_token: SecretString::from("shpat_rotated"),
                webhook_secret: Some(SecretString::from("whsec_new")),
            })
            .await
            .unwrap();

        assert_eq!(reconnected.id, store.id);
        assert_eq!(
            repo.stores_for_tenant(store.tenant_id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn store_domain_cannot_move_between_tenants() {
        let repo = MemoryRepository::new();
        let store = seeded_store(&repo).await;
        let other = repo.create_tenant("Rival").await.unwrap();

        let result = repo
            .upsert_store(StoreUpsert {
                tenant_id: other.id,
                shop_domain: store.shop_domain.clone(),
                access_token: SecretString::from("shpat_stolen"),
                webhook_secret: None,
            })
            .await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = MemoryRepository::new();
        let tenant = repo.create_tenant("Acme").await.unwrap();

        let new_user = NewUser {
            tenant_id: tenant.id,
            name: "Jo".to_string(),
            email: Email::parse("jo@example.com").unwrap(),
            password_hash: "hash".to_string(),
        };
        repo.create_user(new_user.clone()).await.unwrap();

        let result = repo.create_user(new_user).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn recent_sync_logs_are_newest_first_and_bounded() {
        let repo = MemoryRepository::new();
        let store = seeded_store(&repo).await;

        for i in 0..5 {
            repo.append_sync_log(
                store.id,
                SyncEntity::Products,
                SyncStatus::Success,
                &format!("run {i}"),
            )
            .await
            .unwrap();
        }

        let logs = repo.recent_sync_logs(store.id, 3).await.unwrap();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].message, "run 4");
        assert_eq!(logs[2].message, "run 2");
    }
}
