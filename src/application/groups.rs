//! Group listing, creation, details, renaming and deletion.
//!
//! Every group-scoped operation checks in the same order: the group exists
//! (`GroupNotFound`), the actor belongs to it (`NotAMember`), and for
//! management operations the actor is an admin (`AdminRequired`). Input is
//! validated only after those checks pass.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::error::ServiceResult;
use super::validation::validate_group_name;
use crate::domain::policy::{require_admin, require_member};
use crate::domain::{
    DomainError, FamilyGroup, GroupId, GroupSummary, MemberSummary, Membership, Role, User,
};
use crate::infrastructure::AppDependencies;

/// A group as seen by one of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDetails {
    pub group: FamilyGroup,
    pub members: Vec<MemberSummary>,
    /// Role of the member who asked.
    pub role: Role,
}

/// Outcome of a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRenamed {
    pub group: FamilyGroup,
    pub previous_name: String,
}

/// Loads a group or fails with `GroupNotFound`.
pub(crate) async fn load_group(
    dependencies: &AppDependencies,
    group_id: GroupId,
) -> ServiceResult<FamilyGroup> {
    dependencies
        .repositories()
        .groups
        .find_group(group_id)
        .await?
        .ok_or_else(|| DomainError::GroupNotFound(group_id).into())
}

pub(crate) async fn find_membership(
    dependencies: &AppDependencies,
    group_id: GroupId,
    user: &User,
) -> ServiceResult<Option<Membership>> {
    Ok(dependencies
        .repositories()
        .groups
        .find_membership(group_id, user.id)
        .await?)
}

/// Group exists and the actor is a member of it.
pub(crate) async fn load_group_as_member(
    dependencies: &AppDependencies,
    group_id: GroupId,
    actor: &User,
) -> ServiceResult<(FamilyGroup, Membership)> {
    let group = load_group(dependencies, group_id).await?;
    let membership = require_member(
        find_membership(dependencies, group_id, actor).await?,
        group_id,
    )
    .inspect_err(|_| warn!(user_id = %actor.id, %group_id, "Access by non-member denied"))?;
    Ok((group, membership))
}

/// Group exists, the actor is a member, and an admin.
pub(crate) async fn load_group_as_admin(
    dependencies: &AppDependencies,
    group_id: GroupId,
    actor: &User,
) -> ServiceResult<(FamilyGroup, Membership)> {
    let (group, membership) = load_group_as_member(dependencies, group_id, actor).await?;
    require_admin(&membership)
        .inspect_err(|_| warn!(user_id = %actor.id, %group_id, "Admin action by member denied"))?;
    Ok((group, membership))
}

/// Groups the actor belongs to, ordered by id.
///
/// # Errors
///
/// Returns a repository error if the listing fails.
pub async fn list_groups(
    dependencies: &AppDependencies,
    actor: &User,
) -> ServiceResult<Vec<GroupSummary>> {
    let groups = dependencies
        .repositories()
        .groups
        .list_groups_for_user(actor.id)
        .await?;
    debug!(user_id = %actor.id, count = groups.len(), "Listed groups");
    Ok(groups)
}

/// Creates a group with the actor as its first admin.
///
/// # Errors
///
/// Returns a validation error for a bad name.
pub async fn create_group(
    dependencies: &AppDependencies,
    actor: &User,
    name: &str,
) -> ServiceResult<FamilyGroup> {
    let name = validate_group_name(name)?;
    let (group, _) = dependencies
        .repositories()
        .groups
        .create_group_with_admin(&name, actor.id, Utc::now())
        .await?;
    info!(group_id = %group.id, user_id = %actor.id, name = %group.name, "Group created");
    Ok(group)
}

/// The group with its members, for a member.
///
/// # Errors
///
/// Returns `GroupNotFound` or `NotAMember`.
pub async fn group_details(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
) -> ServiceResult<GroupDetails> {
    let (group, membership) = load_group_as_member(dependencies, group_id, actor).await?;
    let members = dependencies
        .repositories()
        .groups
        .list_members(group_id)
        .await?;
    Ok(GroupDetails {
        group,
        members,
        role: membership.role,
    })
}

/// Renames a group.
///
/// # Errors
///
/// Returns `GroupNotFound`, `NotAMember`, `AdminRequired`, or a validation
/// error for a bad name, in that order.
pub async fn rename_group(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
    name: &str,
) -> ServiceResult<GroupRenamed> {
    let (group, _) = load_group_as_admin(dependencies, group_id, actor).await?;
    let name = validate_group_name(name)?;

    if !dependencies
        .repositories()
        .groups
        .rename_group(group_id, &name)
        .await?
    {
        return Err(DomainError::GroupNotFound(group_id).into());
    }

    info!(%group_id, from = %group.name, to = %name, "Group renamed");
    Ok(GroupRenamed {
        previous_name: group.name,
        group: FamilyGroup { name, ..group },
    })
}

/// Deletes a group with all its memberships and tasks.
///
/// # Errors
///
/// Returns `GroupNotFound`, `NotAMember` or `AdminRequired`.
pub async fn delete_group(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
) -> ServiceResult<()> {
    load_group_as_admin(dependencies, group_id, actor).await?;

    if !dependencies
        .repositories()
        .groups
        .delete_group(group_id)
        .await?
    {
        return Err(DomainError::GroupNotFound(group_id).into());
    }

    info!(%group_id, user_id = %actor.id, "Group deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::ServiceError;
    use crate::infrastructure::AppConfig;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dependencies() -> AppDependencies {
        AppDependencies::in_memory(AppConfig::default())
    }

    async fn user(dependencies: &AppDependencies, email: &str) -> User {
        dependencies
            .repositories()
            .users
            .insert_user(email, "hash", Utc::now())
            .await
            .unwrap()
    }

    fn domain(error: ServiceError) -> DomainError {
        match error {
            ServiceError::Domain(error) => error,
            other => panic!("expected domain error, got {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn creator_becomes_admin(dependencies: AppDependencies) {
        let ana = user(&dependencies, "ana@example.com").await;

        let group = create_group(&dependencies, &ana, "  Smiths ").await.unwrap();
        let details = group_details(&dependencies, &ana, group.id).await.unwrap();

        assert_eq!(group.name, "Smiths");
        assert_eq!(details.role, Role::Admin);
        assert_eq!(details.members.len(), 1);
        assert_eq!(details.members[0].email, "ana@example.com");
    }

    #[rstest]
    #[tokio::test]
    async fn list_groups_only_shows_own_groups(dependencies: AppDependencies) {
        let ana = user(&dependencies, "ana@example.com").await;
        let ben = user(&dependencies, "ben@example.com").await;
        let first = create_group(&dependencies, &ana, "Smiths").await.unwrap();
        create_group(&dependencies, &ben, "Joneses").await.unwrap();

        let groups = list_groups(&dependencies, &ana).await.unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group.id, first.id);
        assert_eq!(groups[0].member_count, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn details_check_existence_before_membership(dependencies: AppDependencies) {
        let ana = user(&dependencies, "ana@example.com").await;
        let ben = user(&dependencies, "ben@example.com").await;
        let group = create_group(&dependencies, &ana, "Smiths").await.unwrap();

        let missing = group_details(&dependencies, &ben, GroupId::new(999))
            .await
            .unwrap_err();
        let outsider = group_details(&dependencies, &ben, group.id).await.unwrap_err();

        assert_eq!(domain(missing), DomainError::GroupNotFound(GroupId::new(999)));
        assert_eq!(domain(outsider), DomainError::NotAMember(group.id));
    }

    #[rstest]
    #[tokio::test]
    async fn rename_reports_previous_name(dependencies: AppDependencies) {
        let ana = user(&dependencies, "ana@example.com").await;
        let group = create_group(&dependencies, &ana, "Smiths").await.unwrap();

        let renamed = rename_group(&dependencies, &ana, group.id, "Smith Family")
            .await
            .unwrap();

        assert_eq!(renamed.previous_name, "Smiths");
        assert_eq!(renamed.group.name, "Smith Family");
    }

    #[rstest]
    #[tokio::test]
    async fn rename_checks_permission_before_validating(dependencies: AppDependencies) {
        let ana = user(&dependencies, "ana@example.com").await;
        let ben = user(&dependencies, "ben@example.com").await;
        let group = create_group(&dependencies, &ana, "Smiths").await.unwrap();
        dependencies
            .repositories()
            .groups
            .add_membership(&Membership {
                group_id: group.id,
                user_id: ben.id,
                role: Role::Member,
                joined_at: Utc::now(),
            })
            .await
            .unwrap();

        let error = rename_group(&dependencies, &ben, group.id, "x").await.unwrap_err();

        assert_eq!(domain(error), DomainError::AdminRequired(group.id));
    }

    #[rstest]
    #[tokio::test]
    async fn rename_validates_name(dependencies: AppDependencies) {
        let ana = user(&dependencies, "ana@example.com").await;
        let group = create_group(&dependencies, &ana, "Smiths").await.unwrap();

        let error = rename_group(&dependencies, &ana, group.id, "Abc").await.unwrap_err();

        assert!(matches!(error, ServiceError::Validation(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_group_removes_it(dependencies: AppDependencies) {
        let ana = user(&dependencies, "ana@example.com").await;
        let group = create_group(&dependencies, &ana, "Smiths").await.unwrap();

        delete_group(&dependencies, &ana, group.id).await.unwrap();

        let error = group_details(&dependencies, &ana, group.id).await.unwrap_err();
        assert_eq!(domain(error), DomainError::GroupNotFound(group.id));
        assert!(list_groups(&dependencies, &ana).await.unwrap().is_empty());
    }
}
