//! Domain layer for the family groups application.
//!
//! Pure types and rules with no I/O:
//!
//! - [`user`]: registered accounts and their e-mail identity
//! - [`group`]: family groups, memberships and roles
//! - [`task`]: to-do items assigned inside a group
//! - [`session`]: login sessions
//! - [`policy`]: authorization rules and the "group keeps an admin" invariant
//! - [`errors`]: domain failures raised by those rules

/// Declares an integer row identifier newtype.
///
/// Identifiers are assigned by the store, so there is no `generate`.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database identifier.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

pub(crate) use row_id;

pub mod errors;
pub mod group;
pub mod policy;
pub mod session;
pub mod task;
pub mod user;

pub use errors::DomainError;
pub use group::{FamilyGroup, GroupId, GroupSummary, MemberSummary, Membership, Role};
pub use session::Session;
pub use task::{NewTask, Task, TaskFilter, TaskId, TaskStatusFilter, TaskUpdate};
pub use user::{User, UserId};
