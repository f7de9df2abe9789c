//! Route configuration.
//!
//! # Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | /health | `health_check` |
//! | POST | /auth/register | `register` |
//! | POST | /auth/login | `login` |
//! | POST | /auth/logout | `logout` |
//! | GET | /auth/me | `me` |
//! | GET, POST | /groups | `list_groups`, `create_group` |
//! | GET, PATCH, DELETE | /groups/{group_id} | `group_details`, `rename_group`, `delete_group` |
//! | POST | /groups/{group_id}/members | `add_member` |
//! | PATCH, DELETE | /groups/{group_id}/members/{user_id} | `change_role`, `remove_member` |
//! | POST | /groups/{group_id}/leave | `leave_group` |
//! | GET, POST | /groups/{group_id}/tasks | `list_tasks`, `create_task` |
//! | PATCH, DELETE | /groups/{group_id}/tasks/{task_id} | `update_task`, `delete_task` |
//! | GET | /tasks | `my_tasks` |
//!
//! Every route except `/health`, `/auth/register` and `/auth/login` needs an
//! `Authorization: Bearer <token>` header.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::handlers::{auth, groups, members, tasks};
use crate::infrastructure::AppDependencies;

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
#[allow(clippy::unused_async)]
pub async fn health_check(
    State(_dependencies): State<AppDependencies>,
) -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    (StatusCode::OK, Json(response))
}

/// Creates the router with all API routes.
///
/// # Example
///
/// ```rust,ignore
/// use family_groups::api::create_router;
///
/// let router = create_router(dependencies);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, router).await?;
/// ```
pub fn create_router(dependencies: AppDependencies) -> Router {
    Router::new()
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Groups
        .route("/groups", get(groups::list_groups).post(groups::create_group))
        .route(
            "/groups/{group_id}",
            get(groups::group_details)
                .patch(groups::rename_group)
                .delete(groups::delete_group),
        )
        // Members
        .route("/groups/{group_id}/members", post(members::add_member))
        .route(
            "/groups/{group_id}/members/{user_id}",
            patch(members::change_role).delete(members::remove_member),
        )
        .route("/groups/{group_id}/leave", post(members::leave_group))
        // Tasks
        .route(
            "/groups/{group_id}/tasks",
            get(tasks::list_tasks).post(tasks::create_task),
        )
        .route(
            "/groups/{group_id}/tasks/{task_id}",
            patch(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/tasks", get(tasks::my_tasks))
        // Health
        .route("/health", get(health_check))
        .with_state(dependencies)
}
