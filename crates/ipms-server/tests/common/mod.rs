//! Shared harness for driving the router in-process.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use ipms_server::{AppState, build_router};
use ipms_settings::IpmsSettings;
use ipms_store::Database;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub bug_reports: PathBuf,
    _dir: TempDir,
}

pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct Session {
    pub access: String,
    pub refresh: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(IpmsSettings::default())
    }

    pub fn with_settings(mut settings: IpmsSettings) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bug_reports = dir.path().join("bugs").join("BUG_REPORTS.md");
        settings.server.bug_reports_path = bug_reports.to_string_lossy().into_owned();
        let db = Database::in_memory().unwrap();
        Self {
            router: build_router(AppState::new(settings, db)),
            bug_reports,
            _dir: dir,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        Response {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Response {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Register `username` with password `password123`.
    pub async fn register(&self, username: &str) -> Session {
        let resp = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "password123",
                })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "register failed: {}", resp.body);
        session(&resp)
    }

    pub async fn user_id(&self, session: &Session) -> i64 {
        self.get("/api/auth/me", &session.access).await.body["id"]
            .as_i64()
            .unwrap()
    }
}

pub fn session(resp: &Response) -> Session {
    Session {
        access: resp.body["access_token"].as_str().unwrap().to_owned(),
        refresh: resp.body["refresh_token"].as_str().unwrap().to_owned(),
    }
}
