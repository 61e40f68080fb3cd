//! End-to-end tests for the gate router: dev-login session, code redemption,
//! plan upgrade, verification and the dashboard view.

#![cfg(feature = "server")]

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tempmail_gate::oauth::{AuthClient, OAuthConfig};
use tempmail_gate::server::{GateConfig, router};

const SESSION_COOKIE: &str = "__tempmail_session";

fn test_app() -> Router {
    let oauth = OAuthConfig::new(
        "test-client",
        "test-secret",
        "http://localhost:3001/api/auth/callback".parse().unwrap(),
    );
    // Port 9 (discard) is never served; dashboard-data fetches will fail.
    let config = GateConfig::new(AuthClient::new(oauth))
        .with_dev_login_enabled(true)
        .with_secure_cookies(false)
        .with_service_api_url("http://127.0.0.1:9".parse().unwrap());
    router(config)
}

async fn dev_login(app: &Router, user_id: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/auth/dev-login?user={user_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE))
        .expect("dev-login should set a session cookie")
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn post_json(app: &Router, uri: &str, cookie: Option<&str>, body: Value) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn redemption_requires_authentication() {
    let app = test_app();

    let response = post_json(
        &app,
        "/api/redemption-code",
        None,
        json!({"code": "TEMPMAIL_PRO_2024"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_code_is_rejected() {
    let app = test_app();
    let cookie = dev_login(&app, "100000000000000001").await;

    let response = post_json(
        &app,
        "/api/redemption-code",
        Some(&cookie),
        json!({"code": "DEFINITELY_NOT_A_CODE"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid redemption code");
}

#[tokio::test]
async fn non_string_code_is_a_format_error() {
    let app = test_app();
    let cookie = dev_login(&app, "100000000000000002").await;

    for payload in [json!({}), json!({"code": 42}), json!({"code": null})] {
        let response =
            post_json(&app, "/api/redemption-code", Some(&cookie), payload).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid code format");
    }
}

#[tokio::test]
async fn code_redeems_once_per_user() {
    let app = test_app();
    let u1 = dev_login(&app, "100000000000000003").await;
    let u2 = dev_login(&app, "100000000000000004").await;

    let response = post_json(
        &app,
        "/api/redemption-code",
        Some(&u1),
        json!({"code": " tempmail_pro_2024 "}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["validCode"], true);

    // Same user, same code: refused.
    let response = post_json(
        &app,
        "/api/redemption-code",
        Some(&u1),
        json!({"code": "TEMPMAIL_PRO_2024"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Code already redeemed by this account");

    // Different user, same code: fine.
    let response = post_json(
        &app,
        "/api/redemption-code",
        Some(&u2),
        json!({"code": "TEMPMAIL_PRO_2024"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upgrade_needs_a_redeemed_code() {
    let app = test_app();
    let cookie = dev_login(&app, "100000000000000005").await;

    // Asserting validCode without ever redeeming: refused.
    let response = post_json(
        &app,
        "/api/plan-upgrade",
        Some(&cookie),
        json!({"validCode": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // validCode false after a real redemption: still refused.
    post_json(
        &app,
        "/api/redemption-code",
        Some(&cookie),
        json!({"code": "PREMIUM_ACCESS_2024"}),
    )
    .await;
    let response = post_json(
        &app,
        "/api/plan-upgrade",
        Some(&cookie),
        json!({"validCode": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid upgrade request - valid code required");

    // Redeemed + asserted: upgraded.
    let response = post_json(
        &app,
        "/api/plan-upgrade",
        Some(&cookie),
        json!({"validCode": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["plan"], "pro");

    // Idempotent.
    let response = post_json(
        &app,
        "/api/plan-upgrade",
        Some(&cookie),
        json!({"validCode": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn verify_reports_registry_state() {
    let app = test_app();
    let cookie = dev_login(&app, "100000000000000006").await;

    let response = post_json(
        &app,
        "/api/plan-verify",
        Some(&cookie),
        json!({"userId": "100000000000000006"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["plan"], "free");
    assert_eq!(body["hasProCode"], false);
    assert_eq!(body["verified"], true);

    post_json(
        &app,
        "/api/redemption-code",
        Some(&cookie),
        json!({"code": "UPGRADE_NOW_2024"}),
    )
    .await;
    post_json(
        &app,
        "/api/plan-upgrade",
        Some(&cookie),
        json!({"validCode": true}),
    )
    .await;

    let response = post_json(
        &app,
        "/api/plan-verify",
        Some(&cookie),
        json!({"userId": "100000000000000006"}),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["plan"], "pro");
    assert_eq!(body["hasProCode"], true);
}

#[tokio::test]
async fn verify_rejects_foreign_user_id() {
    let app = test_app();
    let cookie = dev_login(&app, "100000000000000007").await;

    let response = post_json(
        &app,
        "/api/plan-verify",
        Some(&cookie),
        json!({"userId": "999999999999999999"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json(&app, "/api/plan-verify", Some(&cookie), json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_walks_unauth_free_pro() {
    let app = test_app();

    // No session cookie.
    let response = get(&app, "/api/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["accessLevel"], "unauth");

    // Fresh login: free tier.
    let cookie = dev_login(&app, "100000000000000008").await;
    let response = get(&app, "/api/dashboard", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["accessLevel"], "free");
    assert_eq!(body["user"]["plan"], "free");
    assert!(body.get("data").is_none());

    // Redeem + upgrade, then the dashboard syncs the session to pro. The
    // upstream service is unreachable in tests, so the payload degrades to
    // empty rather than erroring.
    post_json(
        &app,
        "/api/redemption-code",
        Some(&cookie),
        json!({"code": "TEMPMAIL_PRO_2024"}),
    )
    .await;
    post_json(
        &app,
        "/api/plan-upgrade",
        Some(&cookie),
        json!({"validCode": true}),
    )
    .await;

    let response = get(&app, "/api/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["accessLevel"], "pro");
    assert_eq!(body["user"]["plan"], "pro");
    assert_eq!(body["user"]["hasProCode"], true);
    assert_eq!(body["data"]["customDomains"], json!([]));
    assert_eq!(body["data"]["mutedSenders"], json!([]));
}

#[tokio::test]
async fn dashboard_data_enforces_ownership_and_surfaces_upstream_failure() {
    let app = test_app();
    let cookie = dev_login(&app, "100000000000000009").await;

    let response = get(
        &app,
        "/api/user/999999999999999999/dashboard-data",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Own data, but the upstream is down: the raw endpoint reports it.
    let response = get(
        &app,
        "/api/user/100000000000000009/dashboard-data",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = test_app();
    let cookie = dev_login(&app, "100000000000000010").await;

    let response = get(&app, "/api/auth/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = post_json(
        &app,
        "/api/redemption-code",
        Some(&cookie),
        json!({"code": "TEMPMAIL_PRO_2024"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_redirects_to_discord_with_state() {
    let app = test_app();

    let response = get(&app, "/api/auth/login", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(location.starts_with("https://discord.com/oauth2/authorize"));
    assert!(location.contains("client_id=test-client"));
    assert!(location.contains("state="));
}
