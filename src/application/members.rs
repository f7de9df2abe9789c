//! Group membership management.
//!
//! Only admins add, remove and re-role members. New members always join as
//! plain members. Any change that would leave a group without an admin is
//! refused with `LastAdmin`; the store makes that check atomically with the
//! write.

use chrono::Utc;
use tracing::{info, warn};

use super::error::ServiceResult;
use super::groups::{find_membership, load_group, load_group_as_admin, load_group_as_member};
use super::validation::validate_member_email;
use crate::domain::policy::require_admin_membership;
use crate::domain::{DomainError, GroupId, MemberSummary, Membership, Role, User, UserId};
use crate::infrastructure::{AppDependencies, MembershipWrite, RepositoryError};

/// Adds a registered user to a group as a plain member.
///
/// # Errors
///
/// In order: `GroupNotFound`, `NotAMember`, `AdminRequired`, a validation
/// error, `UserNotFound`, `AlreadyMember`.
pub async fn add_member(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
    email: &str,
) -> ServiceResult<MemberSummary> {
    load_group_as_admin(dependencies, group_id, actor).await?;
    let email = validate_member_email(email)?;
    let repositories = dependencies.repositories();

    let Some(user) = repositories.users.find_user_by_email(&email).await? else {
        return Err(DomainError::UserNotFound(email).into());
    };

    let already_member = || DomainError::AlreadyMember {
        group_id,
        email: user.email.clone(),
    };
    if find_membership(dependencies, group_id, &user).await?.is_some() {
        return Err(already_member().into());
    }

    let membership = Membership {
        group_id,
        user_id: user.id,
        role: Role::Member,
        joined_at: Utc::now(),
    };
    match repositories.groups.add_membership(&membership).await {
        Ok(()) => {}
        Err(RepositoryError::Duplicate(_)) => return Err(already_member().into()),
        Err(RepositoryError::MissingReference(_)) => {
            return Err(DomainError::GroupNotFound(group_id).into());
        }
        Err(error) => return Err(error.into()),
    }

    info!(%group_id, user_id = %user.id, added_by = %actor.id, "Member added");
    Ok(MemberSummary {
        user_id: user.id,
        email: user.email,
        role: membership.role,
        joined_at: membership.joined_at,
    })
}

/// Removes a member from a group and unassigns their tasks there.
///
/// # Errors
///
/// In order: `GroupNotFound`, `AdminRequired` (also for non-members),
/// `MemberNotFound`, `LastAdmin`.
pub async fn remove_member(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
    user_id: UserId,
) -> ServiceResult<()> {
    load_group(dependencies, group_id).await?;
    require_admin_membership(find_membership(dependencies, group_id, actor).await?, group_id)
        .inspect_err(|_| warn!(user_id = %actor.id, %group_id, "Member removal denied"))?;

    match dependencies
        .repositories()
        .groups
        .remove_membership(group_id, user_id)
        .await?
    {
        MembershipWrite::Applied => {
            info!(%group_id, %user_id, removed_by = %actor.id, "Member removed");
            Ok(())
        }
        MembershipWrite::NotFound => Err(DomainError::MemberNotFound { group_id, user_id }.into()),
        MembershipWrite::WouldOrphanGroup => {
            warn!(%group_id, %user_id, "Refused to remove last admin");
            Err(DomainError::LastAdmin(group_id).into())
        }
    }
}

/// Changes a member's role.
///
/// # Errors
///
/// In order: `GroupNotFound`, `NotAMember`, `AdminRequired`,
/// `MemberNotFound`, `LastAdmin`.
pub async fn change_role(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
    user_id: UserId,
    role: Role,
) -> ServiceResult<Membership> {
    load_group_as_admin(dependencies, group_id, actor).await?;
    let groups = &dependencies.repositories().groups;

    match groups.change_role(group_id, user_id, role).await? {
        MembershipWrite::Applied => {}
        MembershipWrite::NotFound => {
            return Err(DomainError::MemberNotFound { group_id, user_id }.into());
        }
        MembershipWrite::WouldOrphanGroup => {
            warn!(%group_id, %user_id, "Refused to demote last admin");
            return Err(DomainError::LastAdmin(group_id).into());
        }
    }

    info!(%group_id, %user_id, %role, changed_by = %actor.id, "Member role changed");
    groups
        .find_membership(group_id, user_id)
        .await?
        .ok_or_else(|| DomainError::MemberNotFound { group_id, user_id }.into())
}

/// Lets the actor leave a group.
///
/// # Errors
///
/// In order: `GroupNotFound`, `NotAMember`, `LastAdmin`.
pub async fn leave_group(
    dependencies: &AppDependencies,
    actor: &User,
    group_id: GroupId,
) -> ServiceResult<()> {
    load_group_as_member(dependencies, group_id, actor).await?;

    match dependencies
        .repositories()
        .groups
        .remove_membership(group_id, actor.id)
        .await?
    {
        MembershipWrite::Applied => {
            info!(%group_id, user_id = %actor.id, "Member left group");
            Ok(())
        }
        MembershipWrite::NotFound => Err(DomainError::NotAMember(group_id).into()),
        MembershipWrite::WouldOrphanGroup => {
            warn!(%group_id, user_id = %actor.id, "Last admin tried to leave");
            Err(DomainError::LastAdmin(group_id).into())
        }
    }
}
