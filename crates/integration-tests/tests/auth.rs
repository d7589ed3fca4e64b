//! Registration and login flow tests.

use serde_json::json;
use storepulse_integration_tests::TestContext;

#[tokio::test]
async fn register_and_login_issues_a_scoped_token() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;

    assert!(!session.token.is_empty());

    // The token works against a protected endpoint.
    ctx.server
        .get("/stores")
        .add_header("authorization", session.bearer())
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn register_under_unknown_tenant_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Ghost",
            "email": "ghost@example.test",
            "password": "a-long-test-password",
            "tenantId": uuid::Uuid::new_v4(),
        }))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn duplicate_email_registration_is_rejected() {
    let ctx = TestContext::new();
    let session = ctx.onboard("Acme", "jo@acme.test").await;

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Second Jo",
            "email": "jo@acme.test",
            "password": "another-long-password",
            "tenantId": session.tenant_id,
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "A user with this email already exists");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let ctx = TestContext::new();
    ctx.onboard("Acme", "jo@acme.test").await;

    let response = ctx
        .server
        .post("/auth/login")
        .json(&json!({
            "email": "jo@acme.test",
            "password": "wrong-password-entirely",
        }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn unknown_email_gets_the_same_error_as_wrong_password() {
    let ctx = TestContext::new();
    ctx.onboard("Acme", "jo@acme.test").await;

    let wrong_password: serde_json::Value = ctx
        .server
        .post("/auth/login")
        .json(&json!({"email": "jo@acme.test", "password": "nope-nope-nope"}))
        .await
        .json();

    let unknown_email: serde_json::Value = ctx
        .server
        .post("/auth/login")
        .json(&json!({"email": "nobody@acme.test", "password": "nope-nope-nope"}))
        .await
        .json();

    assert_eq!(wrong_password["error"], unknown_email["error"]);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() {
    let ctx = TestContext::new();

    ctx.server.get("/stores").await.assert_status_unauthorized();

    ctx.server
        .get("/metrics/summary")
        .add_header("authorization", "Bearer not-a-real-token")
        .await
        .assert_status_unauthorized();
}
