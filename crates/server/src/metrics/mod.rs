//! Metrics aggregation over synced store data.
//!
//! Three read operations, all scoped to a store that the caller has already
//! resolved from its authenticated tenant: the summary counters, the daily
//! revenue series, and the top-customers leaderboard.
//!
//! # Day bucketing
//!
//! Revenue is grouped by calendar day in the dashboard's reporting timezone,
//! a fixed UTC offset from configuration (default UTC+05:30). Each order's
//! UTC placement time is shifted into that offset and its local calendar
//! date becomes the bucket. Days with no orders are omitted — the series is
//! sparse, ascending by date.
//!
//! Every operation either returns a complete payload or fails; there are no
//! partial results.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use storepulse_core::{CustomerId, StoreId};

use crate::db::{Repository, RepositoryError};

/// How many customers the leaderboard returns.
const TOP_CUSTOMER_LIMIT: i64 = 5;

/// Errors that can occur while computing metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A storage read failed; no partial payload is produced.
    #[error("failed to aggregate metrics: {0}")]
    Aggregation(#[from] RepositoryError),
}

/// Headline counters for a store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    /// Number of synced products.
    pub total_products: i64,
    /// Number of synced customers.
    pub total_customers: i64,
    /// Number of synced orders.
    pub total_orders: i64,
    /// Sum of order totals; zero for a store with no orders.
    pub total_revenue: Decimal,
}

/// One day of the revenue series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    /// Calendar date in the reporting timezone.
    pub date: NaiveDate,
    /// Revenue for that day.
    pub revenue: Decimal,
    /// Number of orders that day.
    pub count: u64,
}

/// A leaderboard entry: customer profile merged with total spend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    /// Internal customer ID.
    pub id: CustomerId,
    /// Shopify-assigned customer ID.
    pub shopify_id: String,
    /// Email, if on file.
    pub email: Option<String>,
    /// First name, if on file.
    pub first_name: Option<String>,
    /// Last name, if on file.
    pub last_name: Option<String>,
    /// Sum of the customer's order totals.
    pub total_spent: Decimal,
}

/// Computes read-optimized views over a store's synced data.
#[derive(Clone)]
pub struct MetricsService {
    repo: Arc<dyn Repository>,
    reporting_offset: FixedOffset,
}

impl MetricsService {
    /// Create a service over the given storage and reporting timezone.
    #[must_use]
    pub fn new(repo: Arc<dyn Repository>, reporting_offset: FixedOffset) -> Self {
        Self {
            repo,
            reporting_offset,
        }
    }

    /// Headline counters and total revenue.
    ///
    /// The four values are read independently — a store being synced
    /// concurrently may produce a snapshot that is internally a few rows
    /// apart, which is acceptable for dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Aggregation` on any storage fault.
    pub async fn summary(&self, store_id: StoreId) -> Result<StoreSummary, MetricsError> {
        Ok(StoreSummary {
            total_products: self.repo.count_products(store_id).await?,
            total_customers: self.repo.count_customers(store_id).await?,
            total_orders: self.repo.count_orders(store_id).await?,
            total_revenue: self.repo.total_revenue(store_id).await?,
        })
    }

    /// Daily revenue within `[from, to)`, defaulting to epoch-to-now.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Aggregation` on any storage fault.
    pub async fn revenue_over_time(
        &self,
        store_id: StoreId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<RevenuePoint>, MetricsError> {
        let from = from.unwrap_or(DateTime::UNIX_EPOCH);
        let to = to.unwrap_or_else(Utc::now);

        let orders = self.repo.orders_between(store_id, from, to).await?;

        let mut buckets: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();
        for order in &orders {
            let day = order
                .created_at
                .with_timezone(&self.reporting_offset)
                .date_naive();
            let bucket = buckets.entry(day).or_insert((Decimal::ZERO, 0));
            bucket.0 += order.total_amount;
            bucket.1 += 1;
        }

        // BTreeMap iteration is ascending by date.
        Ok(buckets
            .into_iter()
            .map(|(date, (revenue, count))| RevenuePoint {
                date,
                revenue,
                count,
            })
            .collect())
    }

    /// Top five customers by total spend, descending. Orders without a
    /// customer link contribute to no one.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::Aggregation` on any storage fault.
    pub async fn top_customers(&self, store_id: StoreId) -> Result<Vec<TopCustomer>, MetricsError> {
        let ranked = self
            .repo
            .customer_spend_totals(store_id, TOP_CUSTOMER_LIMIT)
            .await?;

        Ok(ranked
            .into_iter()
            .map(|(customer, total_spent)| TopCustomer {
                id: customer.id,
                shopify_id: customer.shopify_id,
                email: customer.email,
                first_name: customer.first_name,
                last_name: customer.last_name,
                total_spent,
            })
            .collect())
    }
}
