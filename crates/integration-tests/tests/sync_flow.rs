//! End-to-end sync flow tests: trigger endpoints, audit log, idempotency,
//! and tenant isolation.

use serde_json::json;
use storepulse_integration_tests::TestContext;
use storepulse_server::shopify::types::OrderCustomerRef;
use storepulse_server::shopify::{CustomerPayload, OrderPayload, ProductPayload, VariantPayload};

fn product(id: i64, title: &str, price: &str) -> ProductPayload {
    ProductPayload {
        id,
        title: title.to_string(),
        variants: vec![VariantPayload {
            price: Some(price.to_string()),
        }],
    }
}

#[tokio::test]
async fn product_sync_reports_count_and_logs_success() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;
    let store_id = ctx.connect_store(&session).await;

    *ctx.shopify.products.lock().await =
        vec![product(1, "Mug", "12.00"), product(2, "Shirt", "25.50")];

    let response = ctx
        .server
        .post("/sync/products")
        .add_header("authorization", session.bearer())
        .json(&json!({ "storeId": store_id }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 2);
    assert_eq!(body["message"], "Synced 2 products successfully.");

    let logs: serde_json::Value = ctx
        .server
        .get(&format!("/sync/logs/{store_id}"))
        .add_header("authorization", session.bearer())
        .await
        .json();

    let logs = logs.as_array().expect("logs array");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["entity"], "PRODUCTS");
    assert_eq!(logs[0]["status"], "SUCCESS");
}

#[tokio::test]
async fn empty_collection_syncs_as_success_with_zero_count() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;
    let store_id = ctx.connect_store(&session).await;

    let response = ctx
        .server
        .post("/sync/orders")
        .add_header("authorization", session.bearer())
        .json(&json!({ "storeId": store_id }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 0);
    assert_eq!(body["message"], "Shopify store has no orders to sync.");
}

#[tokio::test]
async fn repeated_sync_does_not_duplicate_rows() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;
    let store_id = ctx.connect_store(&session).await;

    *ctx.shopify.products.lock().await = vec![product(1, "Mug", "12.00")];

    for _ in 0..3 {
        ctx.server
            .post("/sync/products")
            .add_header("authorization", session.bearer())
            .json(&json!({ "storeId": store_id }))
            .await
            .assert_status_ok();
    }

    let summary: serde_json::Value = ctx
        .server
        .get("/metrics/summary")
        .add_header("authorization", session.bearer())
        .await
        .json();
    assert_eq!(summary["totalProducts"], 1);
}

#[tokio::test]
async fn upstream_failure_returns_bad_gateway_and_logs_failed() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;
    let store_id = ctx.connect_store(&session).await;

    *ctx.shopify.fail_with.lock().await = Some((500, "shop is frozen".to_string()));

    let response = ctx
        .server
        .post("/sync/customers")
        .add_header("authorization", session.bearer())
        .json(&json!({ "storeId": store_id }))
        .await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);

    let logs: serde_json::Value = ctx
        .server
        .get(&format!("/sync/logs/{store_id}"))
        .add_header("authorization", session.bearer())
        .await
        .json();

    let logs = logs.as_array().expect("logs array");
    assert_eq!(logs[0]["status"], "FAILED");
    assert_eq!(logs[0]["message"], "shop is frozen");
}

#[tokio::test]
async fn order_sync_links_customers_across_runs() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;
    let store_id = ctx.connect_store(&session).await;

    // Orders arrive first; their customer is not synced yet.
    *ctx.shopify.orders.lock().await = vec![OrderPayload {
        id: 900,
        total_price: Some("49.99".to_string()),
        currency: Some("USD".to_string()),
        customer: Some(OrderCustomerRef { id: 42 }),
        created_at: Some("2024-03-10T10:00:00Z".parse().unwrap()),
    }];

    ctx.server
        .post("/sync/orders")
        .add_header("authorization", session.bearer())
        .json(&json!({ "storeId": store_id }))
        .await
        .assert_status_ok();

    // With no linked customer, the leaderboard is empty.
    let top: serde_json::Value = ctx
        .server
        .get("/metrics/top-customers")
        .add_header("authorization", session.bearer())
        .await
        .json();
    assert_eq!(top.as_array().map(Vec::len), Some(0));

    // Sync the customer, then re-sync orders: the link resolves.
    *ctx.shopify.customers.lock().await = vec![CustomerPayload {
        id: 42,
        email: Some("ada@example.test".to_string()),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
    }];

    ctx.server
        .post("/sync/customers")
        .add_header("authorization", session.bearer())
        .json(&json!({ "storeId": store_id }))
        .await
        .assert_status_ok();

    ctx.server
        .post("/sync/orders")
        .add_header("authorization", session.bearer())
        .json(&json!({ "storeId": store_id }))
        .await
        .assert_status_ok();

    let top: serde_json::Value = ctx
        .server
        .get("/metrics/top-customers")
        .add_header("authorization", session.bearer())
        .await
        .json();
    let top = top.as_array().expect("top customers array");
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["email"], "ada@example.test");

    // Still exactly one order.
    let summary: serde_json::Value = ctx
        .server
        .get("/metrics/summary")
        .add_header("authorization", session.bearer())
        .await
        .json();
    assert_eq!(summary["totalOrders"], 1);
}

#[tokio::test]
async fn syncing_another_tenants_store_is_not_found() {
    let ctx = TestContext::new();
    let acme = ctx.onboard("Acme", "jo@acme.test").await;
    let rival = ctx.onboard("Rival", "sam@rival.test").await;
    let acme_store = ctx.connect_store(&acme).await;

    let response = ctx
        .server
        .post("/sync/products")
        .add_header("authorization", rival.bearer())
        .json(&json!({ "storeId": acme_store }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn unknown_store_is_not_found() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;

    let response = ctx
        .server
        .post("/sync/products")
        .add_header("authorization", session.bearer())
        .json(&json!({ "storeId": uuid::Uuid::new_v4() }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn sync_log_read_is_tenant_checked() {
    let ctx = TestContext::new();
    let acme = ctx.onboard("Acme", "jo@acme.test").await;
    let rival = ctx.onboard("Rival", "sam@rival.test").await;
    let acme_store = ctx.connect_store(&acme).await;

    ctx.server
        .get(&format!("/sync/logs/{acme_store}"))
        .add_header("authorization", rival.bearer())
        .await
        .assert_status_not_found();
}
