//! Authentication flows over HTTP.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use common::{TestApp, session};
use ipms_settings::IpmsSettings;
use serde_json::json;
use wiremock::matchers::{header as match_header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─────────────────────────────────────────────────────────────────────────────
// Register / login
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_returns_tokens_and_cookie() {
    let app = TestApp::new();
    let resp = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "password123",
                "full_name": "Alice A",
            })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["token_type"], "bearer");
    assert!(resp.body["access_token"].is_string());
    assert!(resp.body["refresh_token"].is_string());
    let cookie = resp.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));

    let me = app.get("/api/auth/me", resp.body["access_token"].as_str().unwrap()).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "alice");
    assert_eq!(me.body["full_name"], "Alice A");
    assert!(me.body.get("hashed_password").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = TestApp::new();
    let _ = app.register("alice").await;
    let resp = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "password123",
            })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["detail"], "Username already registered");

    let resp = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "alice2",
                "email": "ALICE@example.com",
                "password": "password123",
            })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["detail"], "Email already registered");
}

#[tokio::test]
async fn registration_validates_fields() {
    let app = TestApp::new();
    let resp = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "bob",
                "email": "bob@example.com",
                "password": "short",
            })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body["detail"].as_str().unwrap().starts_with("password"));
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let app = TestApp::new();
    let _ = app.register("alice").await;
    let resp = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Incorrect username or password");
    assert_eq!(resp.headers[header::WWW_AUTHENTICATE], "Bearer");
}

#[tokio::test]
async fn login_and_token_alias_succeed() {
    let app = TestApp::new();
    let _ = app.register("alice").await;
    for uri in ["/api/auth/login", "/api/auth/token"] {
        let resp = app
            .request(
                Method::POST,
                uri,
                None,
                Some(json!({ "username": "alice", "password": "password123" })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "{uri}");
    }
    let tokens = session(
        &app.request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "password123" })),
        )
        .await,
    );
    let me = app.get("/api/auth/profile", &tokens.access).await;
    assert!(me.body["last_login"].is_string());
}

#[tokio::test]
async fn missing_or_bad_token_is_401() {
    let app = TestApp::new();
    let resp = app.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Could not validate credentials");
    assert_eq!(resp.headers[header::WWW_AUTHENTICATE], "Bearer");

    let resp = app.get("/api/auth/me", "not-a-jwt").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cookie_authenticates_requests() {
    let app = TestApp::new();
    let resp = app
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "password123",
            })),
        )
        .await;
    let set_cookie = resp.headers[header::SET_COOKIE].to_str().unwrap();
    let pair = set_cookie.split(';').next().unwrap().to_owned();

    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/auth/me")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    let me = app.send(req).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["username"], "alice");
}

// ─────────────────────────────────────────────────────────────────────────────
// Refresh / logout
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_rotates_and_old_token_is_rejected() {
    let app = TestApp::new();
    let first = app.register("alice").await;

    let resp = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": first.refresh })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let second = session(&resp);
    assert_ne!(second.refresh, first.refresh);

    let reuse = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": first.refresh })),
        )
        .await;
    assert_eq!(reuse.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reuse.body["detail"], "Invalid or expired refresh token");

    let again = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": second.refresh })),
        )
        .await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_refresh_token() {
    let app = TestApp::new();
    let tokens = app.register("alice").await;

    let resp = app
        .request(
            Method::POST,
            "/api/auth/logout",
            None,
            Some(json!({ "refresh_token": tokens.refresh })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "Successfully logged out");
    let cleared = resp.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("access_token="));
    assert!(cleared.contains("Max-Age=0"));
    assert!(cleared.contains("Path=/"));

    // A known token that is already revoked still logs out.
    let again = app
        .request(
            Method::POST,
            "/api/auth/logout",
            None,
            Some(json!({ "refresh_token": tokens.refresh })),
        )
        .await;
    assert_eq!(again.status, StatusCode::OK);

    let refresh = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": tokens.refresh })),
        )
        .await;
    assert_eq!(refresh.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_with_unknown_token_is_400() {
    let app = TestApp::new();
    let _ = app.register("alice").await;

    let resp = app
        .request(
            Method::POST,
            "/api/auth/logout",
            None,
            Some(json!({ "refresh_token": "never-issued" })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["detail"], "Invalid refresh token");
}

// ─────────────────────────────────────────────────────────────────────────────
// Password reset
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn password_reset_flow() {
    let app = TestApp::new();
    let tokens = app.register("alice").await;

    let missing = app
        .request(
            Method::POST,
            "/api/auth/password-reset/request",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["detail"], "Email not found");

    let issued = app
        .request(
            Method::POST,
            "/api/auth/password-reset/request",
            None,
            Some(json!({ "email": "alice@example.com" })),
        )
        .await;
    assert_eq!(issued.status, StatusCode::OK);
    assert_eq!(issued.body["message"], "Password reset token generated");
    let reset = issued.body["token"].as_str().unwrap().to_owned();

    let verified = app
        .request(
            Method::POST,
            "/api/auth/password-reset/verify",
            None,
            Some(json!({ "token": reset, "new_password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(verified.status, StatusCode::OK);
    assert_eq!(verified.body["message"], "Password reset successful");

    let reused = app
        .request(
            Method::POST,
            "/api/auth/password-reset/verify",
            None,
            Some(json!({ "token": reset, "new_password": "another-pass" })),
        )
        .await;
    assert_eq!(reused.status, StatusCode::BAD_REQUEST);
    assert_eq!(reused.body["detail"], "Invalid or expired reset token");

    let old_login = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "password123" })),
        )
        .await;
    assert_eq!(old_login.status, StatusCode::UNAUTHORIZED);

    let new_login = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "brand-new-pass" })),
        )
        .await;
    assert_eq!(new_login.status, StatusCode::OK);

    let stale_refresh = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(json!({ "refresh_token": tokens.refresh })),
        )
        .await;
    assert_eq!(stale_refresh.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reset_token_hidden_unless_exposed() {
    let mut settings = IpmsSettings::default();
    settings.auth.expose_reset_token = false;
    let app = TestApp::with_settings(settings);
    let _ = app.register("alice").await;
    let issued = app
        .request(
            Method::POST,
            "/api/auth/password-reset/request",
            None,
            Some(json!({ "email": "alice@example.com" })),
        )
        .await;
    assert_eq!(issued.status, StatusCode::OK);
    assert!(issued.body.get("token").is_none());
    assert!(issued.body["expires_at"].is_string());
}

// ─────────────────────────────────────────────────────────────────────────────
// Google
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn google_unconfigured_is_503() {
    let app = TestApp::new();
    let resp = app
        .request(Method::POST, "/api/auth/google", None, Some(json!({ "code": "abc" })))
        .await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

async fn google_app(server: &MockServer) -> TestApp {
    let mut settings = IpmsSettings::default();
    settings.google.client_id = Some("client".into());
    settings.google.client_secret = Some("secret".into());
    settings.google.redirect_uri = Some("http://localhost:3000/callback".into());
    settings.google.token_url = format!("{}/token", server.uri());
    settings.google.userinfo_url = format!("{}/userinfo", server.uri());
    TestApp::with_settings(settings)
}

#[tokio::test]
async fn google_sign_in_creates_then_reuses_account() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "g-token" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(match_header("authorization", "Bearer g-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "g-1",
            "email": "carol@example.com",
            "name": "Carol",
        })))
        .mount(&server)
        .await;
    let app = google_app(&server).await;

    let first = app
        .request(Method::POST, "/api/auth/google", None, Some(json!({ "code": "abc" })))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let me = app.get("/api/auth/me", &session(&first).access).await;
    assert_eq!(me.body["username"], "carol");
    assert_eq!(me.body["full_name"], "Carol");
    assert!(me.body["last_login"].is_string());

    let second = app
        .request(Method::POST, "/api/auth/google", None, Some(json!({ "code": "abc" })))
        .await;
    let me_again = app.get("/api/auth/me", &session(&second).access).await;
    assert_eq!(me_again.body["id"], me.body["id"]);
}

#[tokio::test]
async fn google_links_existing_email_account() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "g-token" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "g-2",
            "email": "alice@example.com",
        })))
        .mount(&server)
        .await;
    let app = google_app(&server).await;
    let local = app.register("alice").await;
    let local_id = app.user_id(&local).await;

    let resp = app
        .request(Method::POST, "/api/auth/google", None, Some(json!({ "code": "abc" })))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(app.user_id(&session(&resp)).await, local_id);
}

#[tokio::test]
async fn google_exchange_failure_is_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;
    let app = google_app(&server).await;
    let resp = app
        .request(Method::POST, "/api/auth/google", None, Some(json!({ "code": "bad" })))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["detail"], "Failed to authenticate with Google");
}
