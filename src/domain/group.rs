//! Family groups, memberships and roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::row_id;
use super::user::UserId;

row_id!(
    /// Identifier of a family group.
    GroupId
);

/// Role of a user inside one group.
///
/// Admins manage the group (rename, members, roles). Members may only view
/// the group and work on its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    /// Returns the string stored in the database for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a stored or submitted role string is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A family group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyGroup {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Link between a user and a group, carrying the user's role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

/// A group as listed on a user's index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub group: FamilyGroup,
    /// Role of the user the listing was made for.
    pub role: Role,
    pub member_count: u64,
}

/// A member as listed on a group's detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Admin, "admin")]
    #[case(Role::Member, "member")]
    fn role_string_round_trip(#[case] role: Role, #[case] text: &str) {
        assert_eq!(role.as_str(), text);
        assert_eq!(text.parse::<Role>().unwrap(), role);
        assert_eq!(role.to_string(), text);
    }

    #[rstest]
    #[case("Admin")]
    #[case("owner")]
    #[case("")]
    fn role_parse_rejects_unknown(#[case] text: &str) {
        assert_eq!(text.parse::<Role>(), Err(UnknownRole(text.to_string())));
    }

    #[rstest]
    fn role_defaults_to_member() {
        assert_eq!(Role::default(), Role::Member);
        assert!(!Role::default().is_admin());
        assert!(Role::Admin.is_admin());
    }

    #[rstest]
    fn role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"member\"").unwrap();
        assert_eq!(role, Role::Member);
    }
}
