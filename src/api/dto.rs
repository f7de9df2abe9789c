//! Request and response bodies.
//!
//! Text fields of request bodies default to empty so that a missing field
//! is reported by validation as "required" rather than as a decoding
//! error.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::application::accounts::LoginOutcome;
use crate::application::groups::{GroupDetails, GroupRenamed};
use crate::application::tasks::{AssigneeChange, TaskChanges, TaskDraft};
use crate::domain::{
    FamilyGroup, GroupId, GroupSummary, MemberSummary, Membership, Role, Task, TaskFilter, TaskId,
    TaskStatusFilter, User, UserId,
};

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

/// Body of group creation and renaming.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupNameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddMemberRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<UserId>,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
}

impl From<CreateTaskRequest> for TaskDraft {
    fn from(request: CreateTaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            assignee_id: request.assignee_id,
            due_date: request.due_date,
        }
    }
}

/// Partial task update. Absent fields are left unchanged.
///
/// `clear_assignee` unassigns the task and wins over `assignee_id`. An
/// empty `description` or `due_date` clears that field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<UserId>,
    pub clear_assignee: bool,
    pub due_date: Option<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTaskRequest> for TaskChanges {
    fn from(request: UpdateTaskRequest) -> Self {
        let assignee = match (request.clear_assignee, request.assignee_id) {
            (true, _) => AssigneeChange::Clear,
            (false, Some(user_id)) => AssigneeChange::Set(user_id),
            (false, None) => AssigneeChange::Keep,
        };
        Self {
            title: request.title,
            description: request.description,
            due_date: request.due_date,
            assignee,
            completed: request.completed,
        }
    }
}

/// Query string of `GET /groups/{group_id}/tasks`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct TaskListQuery {
    pub assignee_id: Option<UserId>,
    pub status: TaskStatusFilter,
}

impl From<TaskListQuery> for TaskFilter {
    fn from(query: TaskListQuery) -> Self {
        Self {
            assignee_id: query.assignee_id,
            status: query.status,
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub remember_me: bool,
    pub user: UserResponse,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            token: outcome.token,
            token_type: "Bearer".to_string(),
            expires_at: outcome.expires_at,
            remember_me: outcome.remember_me,
            user: outcome.user.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<FamilyGroup> for GroupResponse {
    fn from(group: FamilyGroup) -> Self {
        Self {
            id: group.id,
            name: group.name,
            created_at: group.created_at,
        }
    }
}

/// Entry of the caller's group list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummaryResponse {
    pub id: GroupId,
    pub name: String,
    pub role: Role,
    pub member_count: u64,
    pub created_at: DateTime<Utc>,
}

impl From<GroupSummary> for GroupSummaryResponse {
    fn from(summary: GroupSummary) -> Self {
        Self {
            id: summary.group.id,
            name: summary.group.name,
            role: summary.role,
            member_count: summary.member_count,
            created_at: summary.group.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberResponse {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

impl From<MemberSummary> for MemberResponse {
    fn from(member: MemberSummary) -> Self {
        Self {
            user_id: member.user_id,
            email: member.email,
            role: member.role,
            joined_at: member.joined_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetailsResponse {
    #[serde(flatten)]
    pub group: GroupResponse,
    /// Role of the caller.
    pub role: Role,
    pub members: Vec<MemberResponse>,
}

impl From<GroupDetails> for GroupDetailsResponse {
    fn from(details: GroupDetails) -> Self {
        Self {
            group: details.group.into(),
            role: details.role,
            members: details.members.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRenamedResponse {
    #[serde(flatten)]
    pub group: GroupResponse,
    pub previous_name: String,
}

impl From<GroupRenamed> for GroupRenamedResponse {
    fn from(renamed: GroupRenamed) -> Self {
        Self {
            group: renamed.group.into(),
            previous_name: renamed.previous_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipResponse {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

impl From<Membership> for MembershipResponse {
    fn from(membership: Membership) -> Self {
        Self {
            group_id: membership.group_id,
            user_id: membership.user_id,
            role: membership.role,
            joined_at: membership.joined_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: TaskId,
    pub group_id: GroupId,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<UserId>,
    pub created_by: UserId,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            group_id: task.group_id,
            title: task.title,
            description: task.description,
            assignee_id: task.assignee_id,
            created_by: task.created_by,
            completed: task.completed,
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}
