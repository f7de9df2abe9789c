//! Group tasks.
//!
//! Any member may create and list tasks. A task can be edited by a group
//! admin, its creator or its assignee, and deleted by an admin or its
//! creator. Assignees must be members of the task's group.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::error::{ServiceError, ServiceResult};
use super::groups::load_group_as_member;
use super::validation::{validate_new_task, validate_task_changes};
use crate::domain::policy::{can_delete_task, can_edit_task, require_task_permission};
use crate::domain::{
    DomainError, GroupId, NewTask, Task, TaskFilter, TaskId, TaskUpdate, User, UserId,
};
use crate::infrastructure::{AppDependencies, TaskWrite};

/// Fields submitted for a new task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<UserId>,
    /// `YYYY-MM-DD`, empty for none.
    pub due_date: Option<String>,
}

/// What to do with a task's assignee on update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssigneeChange {
    #[default]
    Keep,
    Set(UserId),
    Clear,
}

/// Submitted changes to a task. `None` leaves a field as it is; an empty
/// description or due date clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub assignee: AssigneeChange,
    pub completed: Option<bool>,
}

impl AssigneeChange {
    const fn into_update(self) -> Option<Option<UserId>> {
        match self {
            Self::Keep => None,
            Self::Set(user_id) => Some(Some(user_id)),
            Self::Clear => Some(None),
        }
    }
}

fn assignee_not_member(group_id: GroupId, user_id: Option<UserId>) -> ServiceError {
    match user_id {
        Some(user_id) => {
            warn!(%group_id, %user_id, "Assignee is not a group member");
            DomainError::AssigneeNotMember { group_id, user_id }.into()
        }
        None => ServiceError::Internal(format!(
            "assignee check failed without an assignee in group {group_id}"
        )),
    }
}

async fn load_task(
    dependencies: &AppDependencies,
    group_id: GroupId,
    task_id: TaskId,
) -> ServiceResult<Task> {
    dependencies
        .repositories()
        .tasks
        .find_task(group_id, task_id)
        .await?
        .ok_or_else(|| DomainError::TaskNotFound(task_id).into())
}

/// Creates a task in a group.
///
/// # Errors
///
/// Returns `GroupNotFound`, `NotAMember`, a validation error, or
/// `AssigneeNotMember`.
pub async fn create_task(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
    draft: TaskDraft,
) -> ServiceResult<Task> {
    load_group_as_member(dependencies, group_id, actor).await?;
    let fields = validate_new_task(
        &draft.title,
        draft.description.as_deref(),
        draft.due_date.as_deref(),
    )?;

    let write = dependencies
        .repositories()
        .tasks
        .insert_task(NewTask {
            group_id,
            title: fields.title,
            description: fields.description,
            assignee_id: draft.assignee_id,
            created_by: actor.id,
            due_date: fields.due_date,
            created_at: Utc::now(),
        })
        .await?;

    match write {
        TaskWrite::Applied(task) => {
            info!(task_id = %task.id, %group_id, user_id = %actor.id, "Task created");
            Ok(task)
        }
        TaskWrite::NotFound => Err(DomainError::GroupNotFound(group_id).into()),
        TaskWrite::AssigneeNotMember => Err(assignee_not_member(group_id, draft.assignee_id)),
    }
}

/// Lists a group's tasks, open first.
///
/// # Errors
///
/// Returns `GroupNotFound` or `NotAMember`.
pub async fn list_tasks(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
    filter: TaskFilter,
) -> ServiceResult<Vec<Task>> {
    load_group_as_member(dependencies, group_id, actor).await?;
    let tasks = dependencies
        .repositories()
        .tasks
        .list_tasks(group_id, filter)
        .await?;
    debug!(%group_id, count = tasks.len(), "Listed tasks");
    Ok(tasks)
}

/// Applies changes to a task.
///
/// # Errors
///
/// In order: `GroupNotFound`, `NotAMember`, `TaskNotFound`,
/// `TaskForbidden`, a validation error, `AssigneeNotMember`.
pub async fn update_task(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
    task_id: TaskId,
    changes: TaskChanges,
) -> ServiceResult<Task> {
    let (_, membership) = load_group_as_member(dependencies, group_id, actor).await?;
    let task = load_task(dependencies, group_id, task_id).await?;
    require_task_permission(can_edit_task(&membership, &task), &task)
        .inspect_err(|_| warn!(%task_id, user_id = %actor.id, "Task edit denied"))?;

    let fields = validate_task_changes(
        changes.title.as_deref(),
        changes.description.as_deref(),
        changes.due_date.as_deref(),
    )?;
    let update = TaskUpdate {
        title: fields.title,
        description: fields.description,
        due_date: fields.due_date,
        assignee_id: changes.assignee.into_update(),
        completed: changes.completed,
        updated_at: Utc::now(),
    };

    match dependencies
        .repositories()
        .tasks
        .update_task(group_id, task_id, &update)
        .await?
    {
        TaskWrite::Applied(task) => {
            info!(%task_id, %group_id, user_id = %actor.id, "Task updated");
            Ok(task)
        }
        TaskWrite::NotFound => Err(DomainError::TaskNotFound(task_id).into()),
        TaskWrite::AssigneeNotMember => Err(assignee_not_member(group_id, update.new_assignee())),
    }
}

/// Deletes a task.
///
/// # Errors
///
/// In order: `GroupNotFound`, `NotAMember`, `TaskNotFound`, `TaskForbidden`.
pub async fn delete_task(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
    task_id: TaskId,
) -> ServiceResult<()> {
    let (_, membership) = load_group_as_member(dependencies, group_id, actor).await?;
    let task = load_task(dependencies, group_id, task_id).await?;
    require_task_permission(can_delete_task(&membership, &task), &task)
        .inspect_err(|_| warn!(%task_id, user_id = %actor.id, "Task deletion denied"))?;

    if !dependencies
        .repositories()
        .tasks
        .delete_task(group_id, task_id)
        .await?
    {
        return Err(DomainError::TaskNotFound(task_id).into());
    }

    info!(%task_id, %group_id, user_id = %actor.id, "Task deleted");
    Ok(())
}

/// Open tasks assigned to the actor in any group.
///
/// # Errors
///
/// Returns a repository error if the listing fails.
pub async fn my_tasks(dependencies: &AppDependencies, actor: &User) -> ServiceResult<Vec<Task>> {
    Ok(dependencies
        .repositories()
        .tasks
        .list_open_tasks_for_assignee(actor.id)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::groups::create_group;
    use crate::application::members::{add_member, remove_member};
    use crate::domain::{FamilyGroup, TaskStatusFilter};
    use crate::infrastructure::AppConfig;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    struct Household {
        dependencies: AppDependencies,
        admin: User,
        member: User,
        helper: User,
        outsider: User,
        group: FamilyGroup,
    }

    #[fixture]
    async fn household() -> Household {
        let dependencies = AppDependencies::in_memory(AppConfig::default());
        let users = &dependencies.repositories().users;
        let admin = users.insert_user("ana@example.com", "hash", Utc::now()).await.unwrap();
        let member = users.insert_user("ben@example.com", "hash", Utc::now()).await.unwrap();
        let helper = users.insert_user("cat@example.com", "hash", Utc::now()).await.unwrap();
        let outsider = users.insert_user("dan@example.com", "hash", Utc::now()).await.unwrap();
        let group = create_group(&dependencies, &admin, "Smiths").await.unwrap();
        for email in ["ben@example.com", "cat@example.com"] {
            add_member(&dependencies, &admin, group.id, email).await.unwrap();
        }
        Household {
            dependencies,
            admin,
            member,
            helper,
            outsider,
            group,
        }
    }

    fn draft(title: &str, assignee_id: Option<UserId>) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            assignee_id,
            ..TaskDraft::default()
        }
    }

    fn domain(error: ServiceError) -> DomainError {
        match error {
            ServiceError::Domain(error) => error,
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    // =========================================================================
    // create_task
    // =========================================================================

    #[rstest]
    #[tokio::test]
    async fn member_creates_task(#[future] household: Household) {
        let home = household.await;

        let task = create_task(
            &home.dependencies,
            &home.member,
            home.group.id,
            TaskDraft {
                title: " Buy milk ".to_string(),
                description: Some("Two litres".to_string()),
                assignee_id: Some(home.helper.id),
                due_date: Some("2026-05-01".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.created_by, home.member.id);
        assert_eq!(task.assignee_id, Some(home.helper.id));
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 5, 1));
        assert!(!task.completed);
    }

    #[rstest]
    #[tokio::test]
    async fn assignee_must_be_member(#[future] household: Household) {
        let home = household.await;

        let error = create_task(
            &home.dependencies,
            &home.admin,
            home.group.id,
            draft("Buy milk", Some(home.outsider.id)),
        )
        .await
        .unwrap_err();

        assert_eq!(
            domain(error),
            DomainError::AssigneeNotMember {
                group_id: home.group.id,
                user_id: home.outsider.id
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn outsider_cannot_create_task(#[future] household: Household) {
        let home = household.await;

        let error = create_task(
            &home.dependencies,
            &home.outsider,
            home.group.id,
            draft("Buy milk", None),
        )
        .await
        .unwrap_err();

        assert_eq!(domain(error), DomainError::NotAMember(home.group.id));
    }

    // =========================================================================
    // list_tasks / my_tasks
    // =========================================================================

    #[rstest]
    #[tokio::test]
    async fn list_filters_by_status_and_assignee(#[future] household: Household) {
        let home = household.await;
        let group_id = home.group.id;
        let first = create_task(&home.dependencies, &home.admin, group_id, draft("One", Some(home.member.id)))
            .await
            .unwrap();
        create_task(&home.dependencies, &home.admin, group_id, draft("Two", Some(home.helper.id)))
            .await
            .unwrap();
        update_task(
            &home.dependencies,
            &home.admin,
            group_id,
            first.id,
            TaskChanges {
                completed: Some(true),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();

        let all = list_tasks(&home.dependencies, &home.member, group_id, TaskFilter::default())
            .await
            .unwrap();
        let open = list_tasks(
            &home.dependencies,
            &home.member,
            group_id,
            TaskFilter {
                status: TaskStatusFilter::Open,
                ..TaskFilter::default()
            },
        )
        .await
        .unwrap();
        let for_member = list_tasks(
            &home.dependencies,
            &home.member,
            group_id,
            TaskFilter {
                assignee_id: Some(home.member.id),
                ..TaskFilter::default()
            },
        )
        .await
        .unwrap();

        let titles = |tasks: &[Task]| tasks.iter().map(|task| task.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(&all), vec!["Two", "One"]);
        assert_eq!(titles(&open), vec!["Two"]);
        assert_eq!(titles(&for_member), vec!["One"]);
    }

    #[rstest]
    #[tokio::test]
    async fn my_tasks_lists_open_assignments(#[future] household: Household) {
        let home = household.await;
        create_task(&home.dependencies, &home.admin, home.group.id, draft("Mine", Some(home.member.id)))
            .await
            .unwrap();
        create_task(&home.dependencies, &home.admin, home.group.id, draft("Theirs", Some(home.helper.id)))
            .await
            .unwrap();

        let mine = my_tasks(&home.dependencies, &home.member).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Mine");
    }

    // =========================================================================
    // update_task / delete_task
    // =========================================================================

    #[rstest]
    #[tokio::test]
    async fn assignee_may_edit_but_not_delete(#[future] household: Household) {
        let home = household.await;
        let task = create_task(&home.dependencies, &home.admin, home.group.id, draft("Mow", Some(home.helper.id)))
            .await
            .unwrap();

        let updated = update_task(
            &home.dependencies,
            &home.helper,
            home.group.id,
            task.id,
            TaskChanges {
                description: Some("Front lawn".to_string()),
                completed: Some(true),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();
        let error = delete_task(&home.dependencies, &home.helper, home.group.id, task.id)
            .await
            .unwrap_err();

        assert_eq!(updated.description.as_deref(), Some("Front lawn"));
        assert!(updated.completed);
        assert_eq!(domain(error), DomainError::TaskForbidden(task.id));
    }

    #[rstest]
    #[tokio::test]
    async fn unrelated_member_cannot_edit(#[future] household: Household) {
        let home = household.await;
        let task = create_task(&home.dependencies, &home.admin, home.group.id, draft("Mow", Some(home.helper.id)))
            .await
            .unwrap();

        let error = update_task(
            &home.dependencies,
            &home.member,
            home.group.id,
            task.id,
            TaskChanges {
                title: Some("Hijacked".to_string()),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(domain(error), DomainError::TaskForbidden(task.id));
    }

    #[rstest]
    #[tokio::test]
    async fn creator_can_reassign_and_clear(#[future] household: Household) {
        let home = household.await;
        let task = create_task(&home.dependencies, &home.member, home.group.id, draft("Cook", None))
            .await
            .unwrap();

        let assigned = update_task(
            &home.dependencies,
            &home.member,
            home.group.id,
            task.id,
            TaskChanges {
                assignee: AssigneeChange::Set(home.helper.id),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();
        let cleared = update_task(
            &home.dependencies,
            &home.member,
            home.group.id,
            task.id,
            TaskChanges {
                assignee: AssigneeChange::Clear,
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(assigned.assignee_id, Some(home.helper.id));
        assert_eq!(cleared.assignee_id, None);
    }

    #[rstest]
    #[tokio::test]
    async fn task_from_other_group_is_not_found(#[future] household: Household) {
        let home = household.await;
        let other = create_group(&home.dependencies, &home.outsider, "Joneses")
            .await
            .unwrap();
        let foreign = create_task(&home.dependencies, &home.outsider, other.id, draft("Theirs", None))
            .await
            .unwrap();

        let error = delete_task(&home.dependencies, &home.admin, home.group.id, foreign.id)
            .await
            .unwrap_err();

        assert_eq!(domain(error), DomainError::TaskNotFound(foreign.id));
    }

    #[rstest]
    #[tokio::test]
    async fn admin_deletes_any_task(#[future] household: Household) {
        let home = household.await;
        let task = create_task(&home.dependencies, &home.member, home.group.id, draft("Cook", None))
            .await
            .unwrap();

        delete_task(&home.dependencies, &home.admin, home.group.id, task.id)
            .await
            .unwrap();

        let remaining = list_tasks(&home.dependencies, &home.admin, home.group.id, TaskFilter::default())
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn removing_member_unassigns_their_tasks(#[future] household: Household) {
        let home = household.await;
        let task = create_task(&home.dependencies, &home.admin, home.group.id, draft("Mow", Some(home.helper.id)))
            .await
            .unwrap();

        remove_member(&home.dependencies, &home.admin, home.group.id, home.helper.id)
            .await
            .unwrap();

        let tasks = list_tasks(&home.dependencies, &home.admin, home.group.id, TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(tasks[0].id, task.id);
        assert_eq!(tasks[0].assignee_id, None);
    }

    #[rstest]
    #[tokio::test]
    async fn edits_after_assignee_left_never_reassign_them(#[future] household: Household) {
        let home = household.await;
        let task = create_task(&home.dependencies, &home.admin, home.group.id, draft("Mow", Some(home.helper.id)))
            .await
            .unwrap();
        remove_member(&home.dependencies, &home.admin, home.group.id, home.helper.id)
            .await
            .unwrap();

        let completed = update_task(
            &home.dependencies,
            &home.admin,
            home.group.id,
            task.id,
            TaskChanges {
                completed: Some(true),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap();
        let error = update_task(
            &home.dependencies,
            &home.admin,
            home.group.id,
            task.id,
            TaskChanges {
                assignee: AssigneeChange::Set(home.helper.id),
                ..TaskChanges::default()
            },
        )
        .await
        .unwrap_err();

        assert!(completed.completed);
        assert_eq!(completed.assignee_id, None);
        assert_eq!(
            domain(error),
            DomainError::AssigneeNotMember {
                group_id: home.group.id,
                user_id: home.helper.id
            }
        );
    }
}
