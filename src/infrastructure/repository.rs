//! Repository traits for domain entities.
//!
//! The application layer talks to storage only through these traits. Each
//! trait is object safe (via `async_trait`) so the backend can be chosen at
//! runtime and shared as `Arc<dyn …>` in [`Repositories`].
//!
//! Writes that must respect a cross-row invariant (group creation with its
//! first admin, member removal and role changes under the last-admin rule,
//! group deletion) are single repository calls so every backend can make
//! them atomic.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    FamilyGroup, GroupId, GroupSummary, MemberSummary, Membership, NewTask, Role, Session, Task,
    TaskFilter, TaskId, TaskUpdate, User, UserId,
};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write.
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// The backend failed to execute the operation.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be decoded into a domain value.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// The write refers to a row that does not exist.
    #[error("Missing reference: {0}")]
    MissingReference(String),
}

// =============================================================================
// Membership write outcome
// =============================================================================

/// Outcome of a guarded membership write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipWrite {
    /// The write was applied.
    Applied,
    /// No membership exists for the given group and user.
    NotFound,
    /// The write was refused because the group would have no admin left.
    WouldOrphanGroup,
}

// =============================================================================
// Task write outcome
// =============================================================================

/// Outcome of a task write that checks the assignee's membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskWrite {
    /// The write was applied; holds the stored task.
    Applied(Task),
    /// The task (or, for inserts, its group) does not exist.
    NotFound,
    /// The assignee is not a member of the task's group.
    AssigneeNotMember,
}

// =============================================================================
// Repository Traits
// =============================================================================

/// Storage for registered users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user.
    ///
    /// Returns `RepositoryError::Duplicate` if the e-mail is already taken.
    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<User, RepositoryError>;

    /// Looks a user up by normalized e-mail.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_id(&self, user_id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Storage for groups and their memberships.
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Creates a group and makes `admin` its first administrator, atomically.
    async fn create_group_with_admin(
        &self,
        name: &str,
        admin: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<(FamilyGroup, Membership), RepositoryError>;

    async fn find_group(&self, group_id: GroupId) -> Result<Option<FamilyGroup>, RepositoryError>;

    /// Renames a group. Returns `false` if the group does not exist.
    async fn rename_group(&self, group_id: GroupId, name: &str) -> Result<bool, RepositoryError>;

    /// Deletes a group with its memberships and tasks.
    ///
    /// Returns `false` if the group does not exist.
    async fn delete_group(&self, group_id: GroupId) -> Result<bool, RepositoryError>;

    /// Lists the groups `user_id` belongs to, ordered by group id.
    async fn list_groups_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<GroupSummary>, RepositoryError>;

    async fn find_membership(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<Membership>, RepositoryError>;

    /// Lists a group's members ordered by join time.
    async fn list_members(&self, group_id: GroupId) -> Result<Vec<MemberSummary>, RepositoryError>;

    /// Adds a membership.
    ///
    /// Returns `RepositoryError::Duplicate` if the user already belongs to the
    /// group and `RepositoryError::MissingReference` if the group is gone.
    async fn add_membership(&self, membership: &Membership) -> Result<(), RepositoryError>;

    /// Removes a membership unless it is the group's last admin, and clears
    /// the removed user's task assignments in the group.
    async fn remove_membership(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<MembershipWrite, RepositoryError>;

    /// Changes a member's role unless that demotes the group's last admin.
    async fn change_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: Role,
    ) -> Result<MembershipWrite, RepositoryError>;
}

/// Storage for group tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task if its group still exists and its assignee, if any,
    /// is a member of that group at the moment of the write.
    async fn insert_task(&self, task: NewTask) -> Result<TaskWrite, RepositoryError>;

    /// Finds a task by id, scoped to its group.
    async fn find_task(
        &self,
        group_id: GroupId,
        task_id: TaskId,
    ) -> Result<Option<Task>, RepositoryError>;

    /// Lists a group's tasks, open tasks first, then by id.
    async fn list_tasks(
        &self,
        group_id: GroupId,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, RepositoryError>;

    /// Lists open tasks assigned to a user across all groups.
    async fn list_open_tasks_for_assignee(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Task>, RepositoryError>;

    /// Applies only the fields set in `update` to a stored task.
    ///
    /// A new assignee is checked for membership in the same atomic step as
    /// the write, so an assignment can never outlive the assignee's removal.
    async fn update_task(
        &self,
        group_id: GroupId,
        task_id: TaskId,
        update: &TaskUpdate,
    ) -> Result<TaskWrite, RepositoryError>;

    /// Returns `false` if the task does not exist in the group.
    async fn delete_task(&self, group_id: GroupId, task_id: TaskId)
    -> Result<bool, RepositoryError>;
}

/// Storage for login sessions, keyed by token digest.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn insert_session(&self, session: &Session) -> Result<(), RepositoryError>;

    async fn find_session(&self, token_digest: &str) -> Result<Option<Session>, RepositoryError>;

    /// Returns `false` if no such session existed.
    async fn delete_session(&self, token_digest: &str) -> Result<bool, RepositoryError>;

    /// Deletes every session that expired at or before `now`.
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

// =============================================================================
// Repository bundle
// =============================================================================

/// All repositories used by the application, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Repositories {
    /// Bundles a single store that implements every repository trait.
    pub fn from_store<S>(store: S) -> Self
    where
        S: UserRepository
            + GroupRepository
            + TaskRepository
            + SessionRepository
            + Clone
            + 'static,
    {
        Self {
            users: Arc::new(store.clone()),
            groups: Arc::new(store.clone()),
            tasks: Arc::new(store.clone()),
            sessions: Arc::new(store),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Repositories")
            .field("users", &"<dyn UserRepository>")
            .field("groups", &"<dyn GroupRepository>")
            .field("tasks", &"<dyn TaskRepository>")
            .field("sessions", &"<dyn SessionRepository>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn repository_error_display() {
        assert_eq!(
            RepositoryError::Duplicate("user.email".to_string()).to_string(),
            "Duplicate entry: user.email"
        );
        assert_eq!(
            RepositoryError::DatabaseError("locked".to_string()).to_string(),
            "Database error: locked"
        );
        assert_eq!(
            RepositoryError::MissingReference("group=3".to_string()).to_string(),
            "Missing reference: group=3"
        );
    }

    #[rstest]
    fn membership_write_is_copy() {
        let outcome = MembershipWrite::WouldOrphanGroup;
        let copied = outcome;
        assert_eq!(outcome, copied);
    }
}
