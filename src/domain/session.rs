//! Login sessions.

use chrono::{DateTime, Utc};

use super::user::UserId;

/// A login session.
///
/// Only a keyed digest of the bearer token is kept, so a leaked session
/// table cannot be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token_digest: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remember_me: bool,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
