//! Task handlers.
//!
//! - `GET /groups/{group_id}/tasks` - List, filtered by `assignee_id` and `status`
//! - `POST /groups/{group_id}/tasks` - Create
//! - `PATCH /groups/{group_id}/tasks/{task_id}` - Update
//! - `DELETE /groups/{group_id}/tasks/{task_id}` - Delete
//! - `GET /tasks` - Open tasks assigned to the caller

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::dto::{CreateTaskRequest, TaskListQuery, TaskResponse, UpdateTaskRequest};
use crate::api::error::ApiErrorResponse;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery, AuthenticatedUser};
use crate::application::tasks;
use crate::domain::{GroupId, Task, TaskId};
use crate::infrastructure::AppDependencies;

fn task_list(tasks: Vec<Task>) -> Json<Vec<TaskResponse>> {
    Json(tasks.into_iter().map(Into::into).collect())
}

/// GET /groups/{group_id}/tasks?assignee_id=2&status=open
pub async fn list_tasks(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath(group_id): ApiPath<GroupId>,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let tasks = tasks::list_tasks(&dependencies, &user, group_id, query.into()).await?;
    Ok(task_list(tasks))
}

/// POST /groups/{group_id}/tasks
///
/// # Errors
///
/// - `404 GROUP_NOT_FOUND`
/// - `403 NOT_A_MEMBER`
/// - `400 VALIDATION_ERROR`
/// - `422 ASSIGNEE_NOT_MEMBER`
pub async fn create_task(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath(group_id): ApiPath<GroupId>,
    ApiJson(request): ApiJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiErrorResponse> {
    let task = tasks::create_task(&dependencies, &user, group_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// PATCH /groups/{group_id}/tasks/{task_id}
///
/// # Errors
///
/// - `404 GROUP_NOT_FOUND` / `TASK_NOT_FOUND`
/// - `403 NOT_A_MEMBER` / `TASK_FORBIDDEN`
/// - `400 VALIDATION_ERROR`
/// - `422 ASSIGNEE_NOT_MEMBER`
pub async fn update_task(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath((group_id, task_id)): ApiPath<(GroupId, TaskId)>,
    ApiJson(request): ApiJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let task = tasks::update_task(&dependencies, &user, group_id, task_id, request.into()).await?;
    Ok(Json(task.into()))
}

/// DELETE /groups/{group_id}/tasks/{task_id}
pub async fn delete_task(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath((group_id, task_id)): ApiPath<(GroupId, TaskId)>,
) -> Result<StatusCode, ApiErrorResponse> {
    tasks::delete_task(&dependencies, &user, group_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /tasks
pub async fn my_tasks(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let tasks = tasks::my_tasks(&dependencies, &user).await?;
    Ok(task_list(tasks))
}
