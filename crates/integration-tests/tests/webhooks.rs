//! Webhook endpoint tests: replay idempotency, signature enforcement, and
//! forward compatibility with unknown topics.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use storepulse_integration_tests::{TEST_SHOP_DOMAIN, TestContext};

fn order_body(id: i64, total: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "id": id,
        "total_price": total,
        "currency": "USD",
        "created_at": "2024-03-10T10:00:00Z",
    }))
    .unwrap()
}

fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

#[tokio::test]
async fn order_webhook_creates_the_order_once() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;
    ctx.connect_store(&session).await;

    let body = order_body(900, "59.99");

    // Shopify redelivers webhooks; the second delivery must not duplicate.
    for _ in 0..2 {
        let response = ctx
            .server
            .post("/webhooks/shopify")
            .add_header("x-shopify-shop-domain", TEST_SHOP_DOMAIN)
            .add_header("x-shopify-topic", "orders/create")
            .add_header("content-type", "application/json")
            .bytes(body.clone().into())
            .await;
        response.assert_status_ok();
        let ack: serde_json::Value = response.json();
        assert_eq!(ack["received"], true);
    }

    let summary: serde_json::Value = ctx
        .server
        .get("/metrics/summary")
        .add_header("authorization", session.bearer())
        .await
        .json();
    assert_eq!(summary["totalOrders"], 1);
}

#[tokio::test]
async fn unknown_shop_domain_is_not_found() {
    let ctx = TestContext::new();

    ctx.server
        .post("/webhooks/shopify")
        .add_header("x-shopify-shop-domain", "ghost.myshopify.com")
        .add_header("x-shopify-topic", "orders/create")
        .bytes(order_body(1, "1.00").into())
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn missing_shop_domain_header_is_a_bad_request() {
    let ctx = TestContext::new();

    ctx.server
        .post("/webhooks/shopify")
        .add_header("x-shopify-topic", "orders/create")
        .bytes(order_body(1, "1.00").into())
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn unknown_topics_are_acknowledged_without_mutation() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;
    ctx.connect_store(&session).await;

    ctx.server
        .post("/webhooks/shopify")
        .add_header("x-shopify-shop-domain", TEST_SHOP_DOMAIN)
        .add_header("x-shopify-topic", "customers/redact")
        .bytes(b"{\"id\": 1}".to_vec().into())
        .await
        .assert_status_ok();

    let summary: serde_json::Value = ctx
        .server
        .get("/metrics/summary")
        .add_header("authorization", session.bearer())
        .await
        .json();
    assert_eq!(summary["totalOrders"], 0);
}

#[tokio::test]
async fn signed_store_accepts_only_valid_signatures() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;
    ctx.connect_store_with_domain(&session, TEST_SHOP_DOMAIN, Some("whsec_topsecret"))
        .await;

    let body = order_body(901, "10.00");

    // No signature at all.
    ctx.server
        .post("/webhooks/shopify")
        .add_header("x-shopify-shop-domain", TEST_SHOP_DOMAIN)
        .add_header("x-shopify-topic", "orders/create")
        .bytes(body.clone().into())
        .await
        .assert_status_unauthorized();

    // Signature over different bytes.
    ctx.server
        .post("/webhooks/shopify")
        .add_header("x-shopify-shop-domain", TEST_SHOP_DOMAIN)
        .add_header("x-shopify-topic", "orders/create")
        .add_header("x-shopify-hmac-sha256", sign("whsec_topsecret", b"{}"))
        .bytes(body.clone().into())
        .await
        .assert_status_unauthorized();

    // Correct signature over the exact raw bytes.
    ctx.server
        .post("/webhooks/shopify")
        .add_header("x-shopify-shop-domain", TEST_SHOP_DOMAIN)
        .add_header("x-shopify-topic", "orders/create")
        .add_header("x-shopify-hmac-sha256", sign("whsec_topsecret", &body))
        .bytes(body.into())
        .await
        .assert_status_ok();

    let summary: serde_json::Value = ctx
        .server
        .get("/metrics/summary")
        .add_header("authorization", session.bearer())
        .await
        .json();
    assert_eq!(summary["totalOrders"], 1);
}

#[tokio::test]
async fn webhook_order_links_to_a_synced_customer() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;
    let store_id = ctx.connect_store(&session).await;

    // Sync the customer first.
    *ctx.shopify.customers.lock().await = vec![storepulse_server::shopify::CustomerPayload {
        id: 42,
        email: Some("ada@example.test".to_string()),
        first_name: Some("Ada".to_string()),
        last_name: None,
    }];
    ctx.server
        .post("/sync/customers")
        .add_header("authorization", session.bearer())
        .json(&json!({ "storeId": store_id }))
        .await
        .assert_status_ok();

    let body = serde_json::to_vec(&json!({
        "id": 902,
        "total_price": "75.00",
        "currency": "USD",
        "customer": {"id": 42},
        "created_at": "2024-03-10T10:00:00Z",
    }))
    .unwrap();

    ctx.server
        .post("/webhooks/shopify")
        .add_header("x-shopify-shop-domain", TEST_SHOP_DOMAIN)
        .add_header("x-shopify-topic", "orders/create")
        .bytes(body.into())
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
}
