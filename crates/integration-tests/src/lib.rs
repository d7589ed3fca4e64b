//! Integration test harness for Storepulse.
//!
//! Assembles the real router over the in-memory repository and a scripted
//! Shopify client, so the whole HTTP surface — auth, tenant scoping, sync,
//! webhooks, metrics — is exercised end-to-end without `PostgreSQL` or the
//! network.
//!
//! # Example
//!
//! ```rust,ignore
//! let ctx = TestContext::new();
//! let session = ctx.onboard("Acme", "jo@acme.test").await;
//!
//! ctx.server
//!     .get("/metrics/summary")
//!     .add_header("authorization", session.bearer())
//!     .await
//!     .assert_status_ok();
//! ```

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use secrecy::SecretString;
use tokio::sync::Mutex;

use storepulse_core::TenantId;
use storepulse_server::config::ServerConfig;
use storepulse_server::db::MemoryRepository;
use storepulse_server::models::ShopifyStore;
use storepulse_server::routes;
use storepulse_server::shopify::{
    CustomerPayload, OrderPayload, ProductPayload, ShopifyApi, ShopifyError,
};
use storepulse_server::state::AppState;

/// Shop domain used by the harness when connecting a store.
pub const TEST_SHOP_DOMAIN: &str = "acme.myshopify.com";

/// A scripted Shopify Admin API: tests load it with the collections the next
/// sync should see, or arm it to fail.
#[derive(Default)]
pub struct ScriptedShopify {
    /// Products returned by the next `fetch_products`.
    pub products: Mutex<Vec<ProductPayload>>,
    /// Customers returned by the next `fetch_customers`.
    pub customers: Mutex<Vec<CustomerPayload>>,
    /// Orders returned by the next `fetch_orders`.
    pub orders: Mutex<Vec<OrderPayload>>,
    /// When set, every fetch fails with this upstream status and body.
    pub fail_with: Mutex<Option<(u16, String)>>,
}

impl ScriptedShopify {
    async fn check_failure(&self) -> Result<(), ShopifyError> {
        if let Some((status, message)) = self.fail_with.lock().await.clone() {
            return Err(ShopifyError::Upstream { status, message });
        }
        Ok(())
    }
}

#[async_trait]
impl ShopifyApi for ScriptedShopify {
    async fn fetch_products(
        &self,
        _store: &ShopifyStore,
    ) -> Result<Vec<ProductPayload>, ShopifyError> {
        self.check_failure().await?;
        Ok(self.products.lock().await.clone())
    }

    async fn fetch_customers(
        &self,
        _store: &ShopifyStore,
    ) -> Result<Vec<CustomerPayload>, ShopifyError> {
        self.check_failure().await?;
        Ok(self.customers.lock().await.clone())
    }

    async fn fetch_orders(&self, _store: &ShopifyStore) -> Result<Vec<OrderPayload>, ShopifyError> {
        self.check_failure().await?;
        Ok(self.orders.lock().await.clone())
    }
}

/// An onboarded tenant with a logged-in user.
pub struct Session {
    /// The tenant created for this session.
    pub tenant_id: TenantId,
    /// JWT for the session's user.
    pub token: String,
}

impl Session {
    /// `Authorization` header value for this session.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Test context: the running server plus handles to its doubles.
pub struct TestContext {
    /// In-process test server over the full router.
    pub server: TestServer,
    /// The repository behind the server, for direct state inspection.
    pub repo: Arc<MemoryRepository>,
    /// The scripted Shopify client behind the server.
    pub shopify: Arc<ScriptedShopify>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Build a fresh context with empty storage.
    ///
    /// # Panics
    ///
    /// Panics if the test server cannot be constructed.
    #[must_use]
    pub fn new() -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let shopify = Arc::new(ScriptedShopify::default());

        let state = AppState::new(test_config(), repo.clone(), shopify.clone());
        let server =
            TestServer::new(routes::router().with_state(state)).expect("test server builds");

        Self {
            server,
            repo,
            shopify,
        }
    }

    /// Create a tenant, register a user under it, and log in.
    ///
    /// # Panics
    ///
    /// Panics if any onboarding step does not succeed.
    pub async fn onboard(&self, tenant_name: &str, email: &str) -> Session {
        let tenant: serde_json::Value = self
            .server
            .post("/tenants")
            .json(&serde_json::json!({ "name": tenant_name }))
            .await
            .json();
        let tenant_id: TenantId =
            serde_json::from_value(tenant["id"].clone()).expect("tenant id in response");

        self.server
            .post("/auth/register")
            .json(&serde_json::json!({
                "name": "Test User",
                "email": email,
                "password": "a-long-test-password",
                "tenantId": tenant_id,
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let login: serde_json::Value = self
            .server
            .post("/auth/login")
            .json(&serde_json::json!({
                "email": email,
                "password": "a-long-test-password",
            }))
            .await
            .json();

        Session {
            tenant_id,
            token: login["token"].as_str().expect("token in response").to_string(),
        }
    }

    /// Connect the harness's shop domain for a session and return the store ID.
    ///
    /// # Panics
    ///
    /// Panics if the connect request does not succeed.
    pub async fn connect_store(&self, session: &Session) -> uuid::Uuid {
        self.connect_store_with_domain(session, TEST_SHOP_DOMAIN, None)
            .await
    }

    /// Connect a store on a specific domain, optionally with a webhook secret.
    ///
    /// # Panics
    ///
    /// Panics if the connect request does not succeed.
    pub async fn connect_store_with_domain(
        &self,
        session: &Session,
        domain: &str,
        webhook_secret: Option<&str>,
    ) -> uuid::Uuid {
        let mut body = serde_json::json!({
            "shopDomain": domain,
            "accessToken": "shpat_integration_token",
        });
        if let Some(secret) = webhook_secret {
            body["webhookSecret"] = serde_json::Value::String(secret.to_string());
        }

        let response = self
            .server
            .post("/stores/connect")
            .add_header("authorization", session.bearer())
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let store: serde_json::Value = response.json();
        store["id"]
            .as_str()
            .expect("store id in response")
            .parse()
            .expect("store id is a uuid")
    }
}

fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://unused-in-tests"),
        host: "127.0.0.1".parse::<IpAddr>().expect("valid address"),
        port: 0,
        jwt_secret: SecretString::from("kJ8s0qL2nV5xR7tB1wE4yU6iO9pA3dFg"),
        shopify_api_version: "2024-10".to_string(),
        reporting_offset_minutes: 330,
        sentry_dsn: None,
        sentry_environment: None,
    }
}
