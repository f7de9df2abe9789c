//! Membership handlers.
//!
//! - `POST /groups/{group_id}/members` - Add a registered user (admin)
//! - `PATCH /groups/{group_id}/members/{user_id}` - Change role (admin)
//! - `DELETE /groups/{group_id}/members/{user_id}` - Remove member (admin)
//! - `POST /groups/{group_id}/leave` - Leave the group

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::dto::{AddMemberRequest, ChangeRoleRequest, MemberResponse, MembershipResponse};
use crate::api::error::ApiErrorResponse;
use crate::api::extract::{ApiJson, ApiPath, AuthenticatedUser};
use crate::application::members;
use crate::domain::{GroupId, UserId};
use crate::infrastructure::AppDependencies;

/// POST /groups/{group_id}/members
///
/// # Errors
///
/// - `404 GROUP_NOT_FOUND` / `USER_NOT_FOUND`
/// - `403 NOT_A_MEMBER` / `ADMIN_REQUIRED`
/// - `400 VALIDATION_ERROR`
/// - `409 ALREADY_MEMBER`
pub async fn add_member(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath(group_id): ApiPath<GroupId>,
    ApiJson(request): ApiJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiErrorResponse> {
    let member = members::add_member(&dependencies, &user, group_id, &request.email).await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// PATCH /groups/{group_id}/members/{user_id}
///
/// # Errors
///
/// - `404 GROUP_NOT_FOUND` / `MEMBER_NOT_FOUND`
/// - `403 NOT_A_MEMBER` / `ADMIN_REQUIRED`
/// - `409 LAST_ADMIN`
pub async fn change_role(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath((group_id, member_id)): ApiPath<(GroupId, UserId)>,
    ApiJson(request): ApiJson<ChangeRoleRequest>,
) -> Result<Json<MembershipResponse>, ApiErrorResponse> {
    let membership =
        members::change_role(&dependencies, &user, group_id, member_id, request.role).await?;
    Ok(Json(membership.into()))
}

/// DELETE /groups/{group_id}/members/{user_id}
///
/// # Errors
///
/// - `404 GROUP_NOT_FOUND` / `MEMBER_NOT_FOUND`
/// - `403 ADMIN_REQUIRED`
/// - `409 LAST_ADMIN`
pub async fn remove_member(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath((group_id, member_id)): ApiPath<(GroupId, UserId)>,
) -> Result<StatusCode, ApiErrorResponse> {
    members::remove_member(&dependencies, &user, group_id, member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /groups/{group_id}/leave
///
/// # Errors
///
/// - `404 GROUP_NOT_FOUND`
/// - `403 NOT_A_MEMBER`
/// - `409 LAST_ADMIN`
pub async fn leave_group(
    State(dependencies): State<AppDependencies>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    ApiPath(group_id): ApiPath<GroupId>,
) -> Result<StatusCode, ApiErrorResponse> {
    members::leave_group(&dependencies, &user, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
