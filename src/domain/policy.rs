//! Authorization rules.
//!
//! These are pure functions over memberships and tasks. The application
//! layer loads the rows, asks the policy, and only then writes. The one rule
//! that must hold under concurrent writes, "a group always keeps an admin",
//! is additionally enforced inside each store's write path using
//! [`leaves_group_without_admin`].

use super::errors::DomainError;
use super::group::{GroupId, Membership, Role};
use super::task::Task;

/// Returns the actor's membership or `NotAMember`.
///
/// # Errors
///
/// Returns [`DomainError::NotAMember`] when `membership` is `None`.
pub fn require_member(
    membership: Option<Membership>,
    group_id: GroupId,
) -> Result<Membership, DomainError> {
    membership.ok_or(DomainError::NotAMember(group_id))
}

/// Checks that the actor administers the group.
///
/// # Errors
///
/// Returns [`DomainError::AdminRequired`] for plain members.
pub const fn require_admin(membership: &Membership) -> Result<(), DomainError> {
    if membership.role.is_admin() {
        Ok(())
    } else {
        Err(DomainError::AdminRequired(membership.group_id))
    }
}

/// Like [`require_member`] followed by [`require_admin`], except that a
/// non-member is told `AdminRequired` rather than `NotAMember`.
///
/// Member removal reports both cases the same way.
///
/// # Errors
///
/// Returns [`DomainError::AdminRequired`] unless the actor is an admin.
pub fn require_admin_membership(
    membership: Option<Membership>,
    group_id: GroupId,
) -> Result<Membership, DomainError> {
    match membership {
        Some(membership) if membership.role.is_admin() => Ok(membership),
        _ => Err(DomainError::AdminRequired(group_id)),
    }
}

/// Whether changing one membership would leave the group with no admin.
///
/// `admin_count` is the number of admins before the change, `current` the
/// target's present role and `next` its role afterwards (`None` when the
/// membership is being deleted).
#[must_use]
pub fn leaves_group_without_admin(admin_count: usize, current: Role, next: Option<Role>) -> bool {
    let loses_admin = current.is_admin() && !next.is_some_and(Role::is_admin);
    loses_admin && admin_count <= 1
}

/// Admins, the creator and the assignee may edit a task.
#[must_use]
pub fn can_edit_task(actor: &Membership, task: &Task) -> bool {
    actor.role.is_admin()
        || task.created_by == actor.user_id
        || task.assignee_id == Some(actor.user_id)
}

/// Admins and the creator may delete a task.
#[must_use]
pub fn can_delete_task(actor: &Membership, task: &Task) -> bool {
    actor.role.is_admin() || task.created_by == actor.user_id
}

/// Turns a permission decision into a `TaskForbidden` error.
///
/// # Errors
///
/// Returns [`DomainError::TaskForbidden`] when `allowed` is false.
pub const fn require_task_permission(allowed: bool, task: &Task) -> Result<(), DomainError> {
    if allowed {
        Ok(())
    } else {
        Err(DomainError::TaskForbidden(task.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskId;
    use crate::domain::user::UserId;
    use chrono::Utc;
    use rstest::rstest;

    fn membership(user: i64, role: Role) -> Membership {
        Membership {
            group_id: GroupId::new(1),
            user_id: UserId::new(user),
            role,
            joined_at: Utc::now(),
        }
    }

    fn task(created_by: i64, assignee: Option<i64>) -> Task {
        let now = Utc::now();
        Task {
            id: TaskId::new(10),
            group_id: GroupId::new(1),
            title: "Walk the dog".to_string(),
            description: None,
            assignee_id: assignee.map(UserId::new),
            created_by: UserId::new(created_by),
            completed: false,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Membership checks
    // =========================================================================

    #[rstest]
    fn require_member_rejects_outsider() {
        let result = require_member(None, GroupId::new(3));
        assert_eq!(result, Err(DomainError::NotAMember(GroupId::new(3))));
    }

    #[rstest]
    fn require_member_returns_membership() {
        let member = membership(1, Role::Member);
        assert_eq!(require_member(Some(member.clone()), GroupId::new(1)), Ok(member));
    }

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::Member, false)]
    fn require_admin_by_role(#[case] role: Role, #[case] allowed: bool) {
        assert_eq!(require_admin(&membership(1, role)).is_ok(), allowed);
    }

    #[rstest]
    fn require_admin_membership_treats_outsider_as_not_admin() {
        let result = require_admin_membership(None, GroupId::new(5));
        assert_eq!(result, Err(DomainError::AdminRequired(GroupId::new(5))));
    }

    // =========================================================================
    // Last admin invariant
    // =========================================================================

    #[rstest]
    #[case(1, Role::Admin, None, true)]
    #[case(1, Role::Admin, Some(Role::Member), true)]
    #[case(1, Role::Admin, Some(Role::Admin), false)]
    #[case(2, Role::Admin, None, false)]
    #[case(2, Role::Admin, Some(Role::Member), false)]
    #[case(1, Role::Member, None, false)]
    #[case(1, Role::Member, Some(Role::Admin), false)]
    fn last_admin_guard(
        #[case] admin_count: usize,
        #[case] current: Role,
        #[case] next: Option<Role>,
        #[case] expected: bool,
    ) {
        assert_eq!(leaves_group_without_admin(admin_count, current, next), expected);
    }

    // =========================================================================
    // Task permissions
    // =========================================================================

    #[rstest]
    #[case(membership(1, Role::Admin), task(2, None), true)]
    #[case(membership(2, Role::Member), task(2, None), true)]
    #[case(membership(3, Role::Member), task(2, Some(3)), true)]
    #[case(membership(4, Role::Member), task(2, Some(3)), false)]
    fn edit_permission(#[case] actor: Membership, #[case] task: Task, #[case] expected: bool) {
        assert_eq!(can_edit_task(&actor, &task), expected);
    }

    #[rstest]
    #[case(membership(1, Role::Admin), task(2, None), true)]
    #[case(membership(2, Role::Member), task(2, None), true)]
    #[case(membership(3, Role::Member), task(2, Some(3)), false)]
    fn delete_permission(#[case] actor: Membership, #[case] task: Task, #[case] expected: bool) {
        assert_eq!(can_delete_task(&actor, &task), expected);
    }

    #[rstest]
    fn require_task_permission_reports_task() {
        let task = task(1, None);
        assert_eq!(
            require_task_permission(false, &task),
            Err(DomainError::TaskForbidden(TaskId::new(10)))
        );
        assert_eq!(require_task_permission(true, &task), Ok(()));
    }
}
