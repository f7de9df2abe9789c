//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::row_id;

row_id!(
    /// Identifier of a registered user.
    UserId
);

/// A registered user.
///
/// The password hash never leaves the application layer; API responses are
/// built from the other fields only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Normalized (trimmed, lower-cased) e-mail address. Unique.
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Normalizes an e-mail address for storage and lookup.
///
/// Addresses are compared case-insensitively, so `Alice@Example.com` and
/// `alice@example.com` name the same account.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice@example.com", "alice@example.com")]
    #[case("  Alice@Example.COM ", "alice@example.com")]
    #[case("BOB@HOME.ORG\n", "bob@home.org")]
    fn normalize_email_trims_and_lowercases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_email(input), expected);
    }

    #[rstest]
    fn user_id_round_trips_raw_value() {
        let id = UserId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(UserId::from(42), id);
    }

    #[rstest]
    fn user_id_serializes_transparently() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
