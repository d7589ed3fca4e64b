//! Store connection tests.

use serde_json::json;
use storepulse_integration_tests::{TEST_SHOP_DOMAIN, TestContext};

#[tokio::test]
async fn connect_returns_the_store_without_credentials() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;

    let response = ctx
        .server
        .post("/stores/connect")
        .add_header("authorization", session.bearer())
        .json(&json!({
            "shopDomain": TEST_SHOP_DOMAIN,
            "accessToken": "shpat_secret_token",
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["shopDomain"], TEST_SHOP_DOMAIN);
    // The credential must never appear in a response.
    assert!(body.get("accessToken").is_none());
    assert!(!body.to_string().contains("shpat_secret_token"));
}

#[tokio::test]
async fn reconnecting_the_same_domain_updates_instead_of_duplicating() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;

    let first = ctx.connect_store(&session).await;
    let second = ctx.connect_store(&session).await;
    assert_eq!(first, second, "reconnect must land on the same store row");

    let stores: serde_json::Value = ctx
        .server
        .get("/stores")
        .add_header("authorization", session.bearer())
        .await
        .json();
    assert_eq!(stores.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn domain_connected_to_another_tenant_is_a_conflict() {
    let ctx = TestContext::new();
    let acme = ctx.onboard("Acme", "jo@acme.test").await;
    let rival = ctx.onboard("Rival", "sam@rival.test").await;

    ctx.connect_store(&acme).await;

    let response = ctx
        .server
        .post("/stores/connect")
        .add_header("authorization", rival.bearer())
        .json(&json!({
            "shopDomain": TEST_SHOP_DOMAIN,
            "accessToken": "shpat_other_token",
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn missing_fields_are_a_bad_request() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;

    let response = ctx
        .server
        .post("/stores/connect")
        .add_header("authorization", session.bearer())
        .json(&json!({"shopDomain": "", "accessToken": ""}))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn store_listing_is_tenant_scoped() {
    let ctx = TestContext::new();
    let acme = ctx.onboard("Acme", "jo@acme.test").await;
    let rival = ctx.onboard("Rival", "sam@rival.test").await;

    ctx.connect_store(&acme).await;

    let rival_stores: serde_json::Value = ctx
        .server
        .get("/stores")
        .add_header("authorization", rival.bearer())
        .await
        .json();

    assert_eq!(rival_stores.as_array().map(Vec::len), Some(0));
}
