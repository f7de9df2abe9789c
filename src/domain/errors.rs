//! Domain errors.
//!
//! Every rejection the business rules can produce is a variant here. Each
//! carries the identifiers needed to explain the failure to a client, and
//! the API layer maps variants to HTTP status codes.

use thiserror::Error;

use super::group::GroupId;
use super::task::TaskId;
use super::user::UserId;

/// Failures raised by authorization checks and membership invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("no user registered with e-mail {0}")]
    UserNotFound(String),

    #[error("user {user_id} is not a member of group {group_id}")]
    MemberNotFound { group_id: GroupId, user_id: UserId },

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The acting user does not belong to the group.
    #[error("access to group {0} denied")]
    NotAMember(GroupId),

    /// The acting user belongs to the group but is not an admin.
    #[error("only an administrator of group {0} may do this")]
    AdminRequired(GroupId),

    #[error("{email} is already a member of group {group_id}")]
    AlreadyMember { group_id: GroupId, email: String },

    #[error("e-mail {0} is already registered")]
    EmailTaken(String),

    /// The change would leave the group without any admin.
    #[error("group {0} must keep at least one administrator")]
    LastAdmin(GroupId),

    /// Unknown e-mail or wrong password. Deliberately does not say which.
    #[error("invalid e-mail or password")]
    InvalidCredentials,

    #[error("authentication required")]
    Unauthenticated,

    #[error("user {user_id} cannot be assigned: not a member of group {group_id}")]
    AssigneeNotMember { group_id: GroupId, user_id: UserId },

    #[error("not allowed to change task {0}")]
    TaskForbidden(TaskId),
}
