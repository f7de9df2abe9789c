//! To-do tasks assigned within a group.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::group::GroupId;
use super::row_id;
use super::user::UserId;

row_id!(
    /// Identifier of a task.
    TaskId
);

/// A to-do item belonging to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub group_id: GroupId,
    pub title: String,
    pub description: Option<String>,
    /// Always a member of `group_id` when set.
    pub assignee_id: Option<UserId>,
    pub created_by: UserId,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub group_id: GroupId,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<UserId>,
    pub created_by: UserId,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    /// Materializes the stored task once the store has assigned an id.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            group_id: self.group_id,
            title: self.title,
            description: self.description,
            assignee_id: self.assignee_id,
            created_by: self.created_by,
            completed: false,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// A partial change to a stored task. `None` leaves a field untouched; the
/// inner `None` of the optional fields clears them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub assignee_id: Option<Option<UserId>>,
    pub completed: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl TaskUpdate {
    /// A change that only bumps `updated_at`.
    #[must_use]
    pub const fn touch(updated_at: DateTime<Utc>) -> Self {
        Self {
            title: None,
            description: None,
            due_date: None,
            assignee_id: None,
            completed: None,
            updated_at,
        }
    }

    /// The user this change assigns the task to, if any.
    #[must_use]
    pub fn new_assignee(&self) -> Option<UserId> {
        self.assignee_id.flatten()
    }

    /// Applies the set fields to `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            task.description.clone_from(description);
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(assignee_id) = self.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.updated_at = self.updated_at;
    }
}

/// Which tasks a listing should include by completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatusFilter {
    Open,
    Completed,
    #[default]
    All,
}

impl TaskStatusFilter {
    #[must_use]
    pub const fn accepts(self, completed: bool) -> bool {
        match self {
            Self::Open => !completed,
            Self::Completed => completed,
            Self::All => true,
        }
    }
}

/// Filter applied when listing a group's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskFilter {
    pub assignee_id: Option<UserId>,
    pub status: TaskStatusFilter,
}

impl TaskFilter {
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.accepts(task.completed)
            && self
                .assignee_id
                .is_none_or(|assignee| task.assignee_id == Some(assignee))
    }
}

/// Orders tasks for display: open tasks first, then by id.
pub fn sort_for_display(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| (task.completed, task.id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn task(id: i64, assignee: Option<i64>, completed: bool) -> Task {
        let now = Utc::now();
        Task {
            id: TaskId::new(id),
            group_id: GroupId::new(1),
            title: format!("task {id}"),
            description: None,
            assignee_id: assignee.map(UserId::new),
            created_by: UserId::new(1),
            completed,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(TaskStatusFilter::Open, false, true)]
    #[case(TaskStatusFilter::Open, true, false)]
    #[case(TaskStatusFilter::Completed, true, true)]
    #[case(TaskStatusFilter::Completed, false, false)]
    #[case(TaskStatusFilter::All, true, true)]
    #[case(TaskStatusFilter::All, false, true)]
    fn status_filter_accepts(
        #[case] filter: TaskStatusFilter,
        #[case] completed: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(filter.accepts(completed), expected);
    }

    #[rstest]
    fn filter_by_assignee() {
        let filter = TaskFilter {
            assignee_id: Some(UserId::new(2)),
            status: TaskStatusFilter::All,
        };

        assert!(filter.matches(&task(1, Some(2), false)));
        assert!(!filter.matches(&task(2, Some(3), false)));
        assert!(!filter.matches(&task(3, None, false)));
    }

    #[rstest]
    fn default_filter_matches_everything() {
        let filter = TaskFilter::default();
        assert!(filter.matches(&task(1, None, true)));
        assert!(filter.matches(&task(2, Some(5), false)));
    }

    #[rstest]
    fn sort_puts_open_tasks_first() {
        let mut tasks = vec![task(3, None, false), task(1, None, true), task(2, None, false)];
        sort_for_display(&mut tasks);

        let ids: Vec<i64> = tasks.iter().map(|task| task.id.value()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[rstest]
    fn new_task_starts_open() {
        let now = Utc::now();
        let new_task = NewTask {
            group_id: GroupId::new(1),
            title: "Buy milk".to_string(),
            description: None,
            assignee_id: None,
            created_by: UserId::new(9),
            due_date: None,
            created_at: now,
        };

        let stored = new_task.into_task(TaskId::new(4));

        assert_eq!(stored.id, TaskId::new(4));
        assert!(!stored.completed);
        assert_eq!(stored.updated_at, now);
    }

    #[rstest]
    fn update_touches_only_set_fields() {
        let mut stored = task(1, Some(2), false);
        stored.description = Some("Kitchen".to_string());
        let later = stored.updated_at + chrono::Duration::minutes(5);

        TaskUpdate {
            completed: Some(true),
            ..TaskUpdate::touch(later)
        }
        .apply_to(&mut stored);

        assert!(stored.completed);
        assert_eq!(stored.title, "task 1");
        assert_eq!(stored.description.as_deref(), Some("Kitchen"));
        assert_eq!(stored.assignee_id, Some(UserId::new(2)));
        assert_eq!(stored.updated_at, later);
    }

    #[rstest]
    fn update_can_clear_optional_fields() {
        let mut stored = task(1, Some(2), false);
        stored.description = Some("Kitchen".to_string());
        let update = TaskUpdate {
            description: Some(None),
            assignee_id: Some(None),
            ..TaskUpdate::touch(stored.updated_at)
        };

        update.apply_to(&mut stored);

        assert_eq!(update.new_assignee(), None);
        assert_eq!(stored.description, None);
        assert_eq!(stored.assignee_id, None);
    }
}
