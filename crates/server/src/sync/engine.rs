//! Bulk synchronization engine.
//!
//! One public operation per entity kind, each an independent unit of work:
//! resolve the store, fetch the full collection from Shopify, upsert every
//! item keyed by its Shopify ID, and write exactly one audit log entry for
//! the run. There is no cross-entity transaction — each upsert is its own
//! atomic unit, so an interrupted run leaves a well-defined prefix applied
//! and re-running completes the rest.

use std::sync::Arc;

use storepulse_core::{StoreId, SyncEntity, SyncStatus, parse_money};

use crate::db::{CustomerUpsert, ProductUpsert, Repository};
use crate::models::ShopifyStore;
use crate::shopify::{ShopifyApi, ShopifyError};

use super::{SyncError, apply_order};

/// Products synced from Shopify carry no currency of their own in the REST
/// payload; the shop default is assumed.
const DEFAULT_PRODUCT_CURRENCY: &str = "USD";

/// Orchestrates per-entity bulk synchronization.
#[derive(Clone)]
pub struct SyncEngine {
    repo: Arc<dyn Repository>,
    shopify: Arc<dyn ShopifyApi>,
}

impl SyncEngine {
    /// Create an engine over the given storage and Shopify client.
    #[must_use]
    pub fn new(repo: Arc<dyn Repository>, shopify: Arc<dyn ShopifyApi>) -> Self {
        Self { repo, shopify }
    }

    /// Run a bulk sync for one entity kind and return the item count.
    ///
    /// Exactly one audit log entry is written per run: `SUCCESS` with the
    /// count (an empty collection is a success, not an error), or `FAILED`
    /// with a message derived from the failure.
    ///
    /// # Errors
    ///
    /// - `SyncError::StoreNotFound` if the store ID is unknown
    /// - `SyncError::Shopify` if the Admin API call fails (recorded as a
    ///   `FAILED` audit entry first)
    /// - `SyncError::Repository` if a storage write fails mid-run
    pub async fn sync(&self, store_id: StoreId, entity: SyncEntity) -> Result<u64, SyncError> {
        let store = self
            .repo
            .get_store(store_id)
            .await?
            .ok_or(SyncError::StoreNotFound)?;

        let result = match entity {
            SyncEntity::Products => self.sync_products(&store).await,
            SyncEntity::Customers => self.sync_customers(&store).await,
            SyncEntity::Orders => self.sync_orders(&store).await,
        };

        match result {
            Ok(count) => {
                let message = if count == 0 {
                    format!("Shopify store has no {} to sync.", entity.noun())
                } else {
                    format!("Synced {count} {} successfully.", entity.noun())
                };
                self.repo
                    .append_sync_log(store.id, entity, SyncStatus::Success, &message)
                    .await?;

                tracing::info!(
                    store_id = %store.id,
                    shop = %store.shop_domain,
                    entity = %entity,
                    count,
                    "sync completed"
                );
                Ok(count)
            }
            Err(err) => {
                let message = failure_message(&err);
                if let Err(log_err) = self
                    .repo
                    .append_sync_log(store.id, entity, SyncStatus::Failed, &message)
                    .await
                {
                    tracing::warn!(
                        store_id = %store.id,
                        error = %log_err,
                        "could not record sync failure in audit log"
                    );
                }

                tracing::error!(
                    store_id = %store.id,
                    shop = %store.shop_domain,
                    entity = %entity,
                    error = %err,
                    "sync failed"
                );
                Err(err)
            }
        }
    }

    async fn sync_products(&self, store: &ShopifyStore) -> Result<u64, SyncError> {
        let products = self.shopify.fetch_products(store).await?;

        let mut count = 0u64;
        for product in &products {
            self.repo
                .upsert_product(
                    store.id,
                    ProductUpsert {
                        shopify_id: product.id.to_string(),
                        title: product.title.clone(),
                        price: parse_money(product.first_variant_price()),
                        currency: DEFAULT_PRODUCT_CURRENCY.to_string(),
                    },
                )
                .await?;
            count += 1;
        }

        Ok(count)
    }

    async fn sync_customers(&self, store: &ShopifyStore) -> Result<u64, SyncError> {
        let customers = self.shopify.fetch_customers(store).await?;

        let mut count = 0u64;
        for customer in &customers {
            self.repo
                .upsert_customer(
                    store.id,
                    CustomerUpsert {
                        shopify_id: customer.id.to_string(),
                        email: customer.email.clone(),
                        first_name: customer.first_name.clone(),
                        last_name: customer.last_name.clone(),
                    },
                )
                .await?;
            count += 1;
        }

        Ok(count)
    }

    async fn sync_orders(&self, store: &ShopifyStore) -> Result<u64, SyncError> {
        let orders = self.shopify.fetch_orders(store).await?;

        let mut count = 0u64;
        for order in &orders {
            apply_order(self.repo.as_ref(), store.id, order).await?;
            count += 1;
        }

        Ok(count)
    }
}

/// Build the audit message for a failed run, preferring the upstream error
/// body when Shopify provided one.
fn failure_message(err: &SyncError) -> String {
    match err {
        SyncError::Shopify(ShopifyError::Upstream { message, .. }) if !message.is_empty() => {
            message.clone()
        }
        SyncError::Shopify(ShopifyError::Upstream { .. }) => {
            "An unknown API error occurred.".to_string()
        }
        other => other.to_string(),
    }
}
