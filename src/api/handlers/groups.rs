//! Group handlers.
//!
//! - `GET /groups` - Groups of the caller
//! - `POST /groups` - Create a group, caller becomes admin
//! - `GET /groups/{group_id}` - Group with members
//! - `PATCH /groups/{group_id}` - Rename (admin)
//! - `DELETE /groups/{group_id}` - Delete with members and tasks (admin)

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::dto::{
    GroupDetailsResponse, GroupNameRequest, GroupRenamedResponse, GroupResponse,
    GroupSummaryResponse,
};
use crate::api::error::ApiErrorResponse;
use crate::api::extract::{ApiJson, ApiPath, AuthenticatedUser};
use crate::application::groups;
use crate::domain::GroupId;
use crate::infrastructure::AppDependencies;

/// GET /groups
pub async fn list_groups(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
) -> Result<Json<Vec<GroupSummaryResponse>>, ApiErrorResponse> {
    let groups = groups::list_groups(&dependencies, &user).await?;
    Ok(Json(groups.into_iter().map(Into::into).collect()))
}

/// POST /groups
///
/// # Errors
///
/// - `400 VALIDATION_ERROR` - Name not 5 to 15 characters
pub async fn create_group(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiJson(request): ApiJson<GroupNameRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiErrorResponse> {
    let group = groups::create_group(&dependencies, &user, &request.name).await?;
    Ok((StatusCode::CREATED, Json(group.into())))
}

/// GET /groups/{group_id}
///
/// # Errors
///
/// - `404 GROUP_NOT_FOUND`
/// - `403 NOT_A_MEMBER`
pub async fn group_details(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath(group_id): ApiPath<GroupId>,
) -> Result<Json<GroupDetailsResponse>, ApiErrorResponse> {
    let details = groups::group_details(&dependencies, &user, group_id).await?;
    Ok(Json(details.into()))
}

/// PATCH /groups/{group_id}
///
/// # Errors
///
/// - `404 GROUP_NOT_FOUND`
/// - `403 NOT_A_MEMBER` / `ADMIN_REQUIRED`
/// - `400 VALIDATION_ERROR`
pub async fn rename_group(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath(group_id): ApiPath<GroupId>,
    ApiJson(request): ApiJson<GroupNameRequest>,
) -> Result<Json<GroupRenamedResponse>, ApiErrorResponse> {
    let renamed = groups::rename_group(&dependencies, &user, group_id, &request.name).await?;
    Ok(Json(renamed.into()))
}

/// DELETE /groups/{group_id}
pub async fn delete_group(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath(group_id): ApiPath<GroupId>,
) -> Result<StatusCode, ApiErrorResponse> {
    groups::delete_group(&dependencies, &user, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
