//! In-memory repository implementation.
//!
//! A single [`InMemoryStore`] implements every repository trait over one
//! `Arc<RwLock<...>>`. Compound writes hold the write lock for their whole
//! duration, which makes them atomic in the same way a database transaction
//! would. Suitable for tests, demos and `STORAGE_MODE=in_memory`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::policy::leaves_group_without_admin;
use crate::domain::task::sort_for_display;
use crate::domain::{
    FamilyGroup, GroupId, GroupSummary, MemberSummary, Membership, NewTask, Role, Session, Task,
    TaskFilter, TaskId, TaskUpdate, User, UserId,
};
use crate::infrastructure::{
    GroupRepository, MembershipWrite, RepositoryError, SessionRepository, TaskRepository,
    TaskWrite, UserRepository,
};

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    groups: BTreeMap<GroupId, FamilyGroup>,
    memberships: BTreeMap<(GroupId, UserId), Membership>,
    tasks: BTreeMap<TaskId, Task>,
    sessions: HashMap<String, Session>,
    last_user_id: i64,
    last_group_id: i64,
    last_task_id: i64,
}

impl MemoryState {
    fn admin_count(&self, group_id: GroupId) -> usize {
        self.members_of(group_id)
            .filter(|membership| membership.role.is_admin())
            .count()
    }

    fn members_of(&self, group_id: GroupId) -> impl Iterator<Item = &Membership> {
        self.memberships
            .range((group_id, UserId::new(i64::MIN))..=(group_id, UserId::new(i64::MAX)))
            .map(|(_, membership)| membership)
    }

    fn is_member(&self, group_id: GroupId, user_id: UserId) -> bool {
        self.memberships.contains_key(&(group_id, user_id))
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-memory implementation of all repository traits.
///
/// Cloning is cheap and every clone shares the same data.
///
/// # Example
///
/// ```ignore
/// use family_groups::infrastructure::{InMemoryStore, Repositories};
///
/// let repositories = Repositories::from_store(InMemoryStore::new());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<User, RepositoryError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|user| user.email == email) {
            return Err(RepositoryError::Duplicate(format!("user.email={email}")));
        }

        state.last_user_id += 1;
        let user = User {
            id: UserId::new(state.last_user_id),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_id(&self, user_id: UserId) -> Result<Option<User>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn create_group_with_admin(
        &self,
        name: &str,
        admin: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<(FamilyGroup, Membership), RepositoryError> {
        let mut state = self.state.write().await;
        state.last_group_id += 1;

        let group = FamilyGroup {
            id: GroupId::new(state.last_group_id),
            name: name.to_string(),
            created_at,
        };
        let membership = Membership {
            group_id: group.id,
            user_id: admin,
            role: Role::Admin,
            joined_at: created_at,
        };

        state.groups.insert(group.id, group.clone());
        state
            .memberships
            .insert((group.id, admin), membership.clone());
        Ok((group, membership))
    }

    async fn find_group(&self, group_id: GroupId) -> Result<Option<FamilyGroup>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.groups.get(&group_id).cloned())
    }

    async fn rename_group(&self, group_id: GroupId, name: &str) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.groups.get_mut(&group_id).is_some_and(|group| {
            group.name = name.to_string();
            true
        }))
    }

    async fn delete_group(&self, group_id: GroupId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        if state.groups.remove(&group_id).is_none() {
            return Ok(false);
        }
        state.memberships.retain(|(group, _), _| *group != group_id);
        state.tasks.retain(|_, task| task.group_id != group_id);
        Ok(true)
    }

    async fn list_groups_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<GroupSummary>, RepositoryError> {
        let state = self.state.read().await;
        let summaries = state
            .memberships
            .values()
            .filter(|membership| membership.user_id == user_id)
            .filter_map(|membership| {
                state.groups.get(&membership.group_id).map(|group| GroupSummary {
                    group: group.clone(),
                    role: membership.role,
                    member_count: state.members_of(group.id).count() as u64,
                })
            })
            .collect();
        Ok(summaries)
    }

    async fn find_membership(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<Membership>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.memberships.get(&(group_id, user_id)).cloned())
    }

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<MemberSummary>, RepositoryError> {
        let state = self.state.read().await;
        let mut members: Vec<MemberSummary> = state
            .members_of(group_id)
            .filter_map(|membership| {
                state.users.get(&membership.user_id).map(|user| MemberSummary {
                    user_id: user.id,
                    email: user.email.clone(),
                    role: membership.role,
                    joined_at: membership.joined_at,
                })
            })
            .collect();
        members.sort_by_key(|member| (member.joined_at, member.user_id));
        Ok(members)
    }

    async fn add_membership(&self, membership: &Membership) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&membership.group_id) {
            return Err(RepositoryError::MissingReference(format!(
                "group={}",
                membership.group_id
            )));
        }
        let key = (membership.group_id, membership.user_id);
        if state.memberships.contains_key(&key) {
            return Err(RepositoryError::Duplicate(format!(
                "group_member=({}, {})",
                membership.group_id, membership.user_id
            )));
        }
        state.memberships.insert(key, membership.clone());
        Ok(())
    }

    async fn remove_membership(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<MembershipWrite, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(current) = state.memberships.get(&(group_id, user_id)).map(|m| m.role) else {
            return Ok(MembershipWrite::NotFound);
        };
        if leaves_group_without_admin(state.admin_count(group_id), current, None) {
            return Ok(MembershipWrite::WouldOrphanGroup);
        }

        state.memberships.remove(&(group_id, user_id));
        state
            .tasks
            .values_mut()
            .filter(|task| task.group_id == group_id && task.assignee_id == Some(user_id))
            .for_each(|task| task.assignee_id = None);
        Ok(MembershipWrite::Applied)
    }

    async fn change_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: Role,
    ) -> Result<MembershipWrite, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(current) = state.memberships.get(&(group_id, user_id)).map(|m| m.role) else {
            return Ok(MembershipWrite::NotFound);
        };
        if leaves_group_without_admin(state.admin_count(group_id), current, Some(role)) {
            return Ok(MembershipWrite::WouldOrphanGroup);
        }

        if let Some(membership) = state.memberships.get_mut(&(group_id, user_id)) {
            membership.role = role;
        }
        Ok(MembershipWrite::Applied)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn insert_task(&self, task: NewTask) -> Result<TaskWrite, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.groups.contains_key(&task.group_id) {
            return Ok(TaskWrite::NotFound);
        }
        if let Some(assignee_id) = task.assignee_id
            && !state.is_member(task.group_id, assignee_id)
        {
            return Ok(TaskWrite::AssigneeNotMember);
        }

        state.last_task_id += 1;
        let task = task.into_task(TaskId::new(state.last_task_id));
        state.tasks.insert(task.id, task.clone());
        Ok(TaskWrite::Applied(task))
    }

    async fn find_task(
        &self,
        group_id: GroupId,
        task_id: TaskId,
    ) -> Result<Option<Task>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .get(&task_id)
            .filter(|task| task.group_id == group_id)
            .cloned())
    }

    async fn list_tasks(
        &self,
        group_id: GroupId,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, RepositoryError> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.group_id == group_id && filter.matches(task))
            .cloned()
            .collect();
        sort_for_display(&mut tasks);
        Ok(tasks)
    }

    async fn list_open_tasks_for_assignee(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Task>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|task| !task.completed && task.assignee_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn update_task(
        &self,
        group_id: GroupId,
        task_id: TaskId,
        update: &TaskUpdate,
    ) -> Result<TaskWrite, RepositoryError> {
        let mut state = self.state.write().await;
        let assignable = update
            .new_assignee()
            .is_none_or(|assignee_id| state.is_member(group_id, assignee_id));

        let Some(stored) = state
            .tasks
            .get_mut(&task_id)
            .filter(|task| task.group_id == group_id)
        else {
            return Ok(TaskWrite::NotFound);
        };
        if !assignable {
            return Ok(TaskWrite::AssigneeNotMember);
        }
        update.apply_to(stored);
        Ok(TaskWrite::Applied(stored.clone()))
    }

    async fn delete_task(
        &self,
        group_id: GroupId,
        task_id: TaskId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let belongs = state
            .tasks
            .get(&task_id)
            .is_some_and(|task| task.group_id == group_id);
        if belongs {
            state.tasks.remove(&task_id);
        }
        Ok(belongs)
    }
}

#[async_trait]
impl SessionRepository for InMemoryStore {
    async fn insert_session(&self, session: &Session) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state
            .sessions
            .insert(session.token_digest.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token_digest: &str) -> Result<Option<Session>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.sessions.get(token_digest).cloned())
    }

    async fn delete_session(&self, token_digest: &str) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        Ok(state.sessions.remove(token_digest).is_some())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, session| !session.is_expired(now));
        Ok((before - state.sessions.len()) as u64)
    }
}
