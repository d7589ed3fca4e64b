//! Shopify Admin REST API client.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;

use crate::models::ShopifyStore;

use super::types::{CustomersEnvelope, OrdersEnvelope, ProductsEnvelope};
use super::{CustomerPayload, OrderPayload, ProductPayload, ShopifyApi, ShopifyError};

/// Request timeout for Admin API calls. This is the only network-bound
/// suspension point in a sync run, so it must be bounded.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Shopify Admin REST API client.
///
/// Holds no per-store state: the shop domain and access token come from the
/// [`ShopifyStore`] on every call, since each tenant's store carries its own
/// credential.
#[derive(Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    api_version: String,
    scheme: &'static str,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(api_version: impl Into<String>) -> Result<Self, ShopifyError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_version: api_version.into(),
            scheme: "https",
        })
    }

    /// Perform a GET against the store's Admin API and parse the JSON body.
    ///
    /// The access token travels only in the request header; it is never
    /// interpolated into the URL or logged.
    async fn get_json<T: DeserializeOwned>(
        &self,
        store: &ShopifyStore,
        resource: &str,
    ) -> Result<T, ShopifyError> {
        let url = format!(
            "{}://{}/admin/api/{}/{resource}",
            self.scheme, store.shop_domain, self.api_version
        );

        tracing::debug!(shop = %store.shop_domain, %resource, "Shopify Admin API request");

        let response = self
            .http
            .get(&url)
            .header("X-Shopify-Access-Token", store.access_token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => {
                let message = response.text().await.unwrap_or_default();
                Err(ShopifyError::Auth(message))
            }
            404 => Err(ShopifyError::NotFound(resource.to_string())),
            429 => Err(ShopifyError::RateLimited),
            _ if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                Err(ShopifyError::Upstream {
                    status: status.as_u16(),
                    message,
                })
            }
            _ => Ok(response.json::<T>().await?),
        }
    }
}

#[async_trait]
impl ShopifyApi for AdminClient {
    async fn fetch_products(
        &self,
        store: &ShopifyStore,
    ) -> Result<Vec<ProductPayload>, ShopifyError> {
        let envelope: ProductsEnvelope = self.get_json(store, "products.json").await?;
        Ok(envelope.products)
    }

    async fn fetch_customers(
        &self,
        store: &ShopifyStore,
    ) -> Result<Vec<CustomerPayload>, ShopifyError> {
        let envelope: CustomersEnvelope = self.get_json(store, "customers.json").await?;
        Ok(envelope.customers)
    }

    async fn fetch_orders(&self, store: &ShopifyStore) -> Result<Vec<OrderPayload>, ShopifyError> {
        let envelope: OrdersEnvelope = self.get_json(store, "orders.json?status=any").await?;
        Ok(envelope.orders)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use secrecy::SecretString;
    use storepulse_core::{StoreId, TenantId};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_client() -> AdminClient {
        AdminClient {
            http: reqwest::Client::new(),
            api_version: "2024-10".to_string(),
            scheme: "http",
        }
    }

    fn store_for(server: &MockServer) -> ShopifyStore {
        let domain = server
            .uri()
            .trim_start_matches("http://")
            .to_string();

        ShopifyStore {
            id: StoreId::generate(),
            tenant_id: TenantId::generate(),
            shop_domain: domain,
            access_token: SecretString::from("shpat_test_token"),
            webhook_secret: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn fetches_and_parses_products() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2024-10/products.json"))
            .and(header("X-Shopify-Access-Token", "shpat_test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "products": [
                    {"id": 1, "title": "Mug", "variants": [{"price": "12.00"}]},
                    {"id": 2, "title": "Shirt", "variants": []}
                ]
            })))
            .mount(&server)
            .await;

        let products = test_client()
            .fetch_products(&store_for(&server))
            .await
            .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].first_variant_price(), Some("12.00"));
        assert_eq!(products[1].first_variant_price(), None);
    }

    #[tokio::test]
    async fn classifies_invalid_token_as_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"errors":"[API] Invalid API key or access token"}"#),
            )
            .mount(&server)
            .await;

        let err = test_client()
            .fetch_customers(&store_for(&server))
            .await
            .unwrap_err();

        assert!(matches!(err, ShopifyError::Auth(_)));
    }

    #[tokio::test]
    async fn classifies_missing_resource_as_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = test_client()
            .fetch_products(&store_for(&server))
            .await
            .unwrap_err();

        assert!(matches!(err, ShopifyError::NotFound(_)));
    }

    #[tokio::test]
    async fn classifies_throttling_as_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = test_client()
            .fetch_orders(&store_for(&server))
            .await
            .unwrap_err();

        assert!(matches!(err, ShopifyError::RateLimited));
    }

    #[tokio::test]
    async fn classifies_server_fault_as_upstream_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = test_client()
            .fetch_orders(&store_for(&server))
            .await
            .unwrap_err();

        match err {
            ShopifyError::Upstream { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn orders_request_includes_any_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2024-10/orders.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"orders": []})),
            )
            .mount(&server)
            .await;

        let orders = test_client()
            .fetch_orders(&store_for(&server))
            .await
            .unwrap();

        assert!(orders.is_empty());
        // The mock server recorded exactly one request; its query carried status=any.
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url.query(), Some("status=any"));
    }
}
