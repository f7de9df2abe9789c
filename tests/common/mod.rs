//! Common helpers for the HTTP integration tests.
//!
//! Each test builds a fresh [`TestApp`] over either backend and drives the
//! router in-process with `tower::ServiceExt::oneshot`.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because every file
//! under `tests/` is compiled as its own crate and uses a different subset
//! of these helpers.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use family_groups::api::create_router;
use family_groups::infrastructure::{
    AppConfig, AppDependencies, InMemoryStore, Repositories, SqliteStore, StorageMode,
};

pub const PASSWORD: &str = "Secret123";

/// Storage backend a test runs against.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    InMemory,
    Sqlite,
}

/// Configuration with cheap password hashing for tests.
pub fn test_config() -> AppConfig {
    AppConfig {
        secret_key: "test-secret".to_string(),
        storage_mode: StorageMode::InMemory,
        database_url: "sqlite::memory:".to_string(),
        password_hash_iterations: 1,
        ..AppConfig::default()
    }
}

pub struct TestApp {
    router: Router,
    pub dependencies: AppDependencies,
}

/// A registered and logged-in user.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub async fn new(backend: Backend) -> Self {
        let repositories = match backend {
            Backend::InMemory => Repositories::from_store(InMemoryStore::new()),
            Backend::Sqlite => Repositories::from_store(
                SqliteStore::connect("sqlite::memory:")
                    .await
                    .expect("in-memory SQLite should open"),
            ),
        };
        let dependencies = AppDependencies::new(test_config(), repositories);
        Self {
            router: create_router(dependencies.clone()),
            dependencies,
        }
    }

    /// Sends a request and returns the status with the decoded JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, Some(token), None).await
    }

    /// Registers `email` with [`PASSWORD`] and logs in.
    pub async fn user(&self, email: &str) -> TestUser {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "password_confirmation": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let id = body["id"].as_i64().expect("user id");

        let (status, body) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        TestUser {
            id,
            email: email.to_string(),
            token: body["token"].as_str().expect("token").to_string(),
        }
    }

    /// Creates a group owned by `admin` and returns its id.
    pub async fn group(&self, admin: &TestUser, name: &str) -> i64 {
        let (status, body) = self
            .post("/groups", &admin.token, json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create group failed: {body}");
        body["id"].as_i64().expect("group id")
    }

    /// Adds `member` to the group as `admin`.
    pub async fn join(&self, admin: &TestUser, group_id: i64, member: &TestUser) {
        let (status, body) = self
            .post(
                &format!("/groups/{group_id}/members"),
                &admin.token,
                json!({ "email": member.email }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "add member failed: {body}");
    }
}

/// Asserts an error response's status and code.
pub fn assert_error(response: &(StatusCode, Value), status: StatusCode, code: &str) {
    assert_eq!(response.0, status, "unexpected body: {}", response.1);
    assert_eq!(response.1["code"], code, "unexpected body: {}", response.1);
}
