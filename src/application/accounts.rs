//! Registration, login and session resolution.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::error::{ServiceError, ServiceResult};
use super::security::{PasswordHasher, generate_session_token, token_digest};
use super::validation::{validate_login, validate_registration};
use crate::domain::{DomainError, Session, User};
use crate::infrastructure::{AppDependencies, RepositoryError};

/// Result of a successful login. `token` is shown to the client once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub remember_me: bool,
    pub user: User,
}

fn password_hasher(dependencies: &AppDependencies) -> PasswordHasher {
    PasswordHasher::new(dependencies.config().password_hash_iterations)
}

/// Runs the CPU-heavy hashing off the async worker threads.
async fn run_blocking<T, F>(work: F) -> ServiceResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|error| ServiceError::Internal(error.to_string()))
}

/// Registers a new account.
///
/// # Errors
///
/// Returns a validation error for a bad form and `EmailTaken` when the
/// address is already registered.
pub async fn register(
    dependencies: &AppDependencies,
    email: &str,
    password: &str,
    password_confirmation: &str,
) -> ServiceResult<User> {
    let registration = validate_registration(email, password, password_confirmation)?;
    let users = &dependencies.repositories().users;

    if users.find_user_by_email(&registration.email).await?.is_some() {
        warn!(email = %registration.email, "Registration refused: e-mail already taken");
        return Err(DomainError::EmailTaken(registration.email).into());
    }

    let hasher = password_hasher(dependencies);
    let password = registration.password;
    let password_hash = run_blocking(move || hasher.hash(&password)).await?;

    match users
        .insert_user(&registration.email, &password_hash, Utc::now())
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "User registered");
            Ok(user)
        }
        Err(RepositoryError::Duplicate(_)) => {
            warn!(email = %registration.email, "Registration lost race on e-mail");
            Err(DomainError::EmailTaken(registration.email).into())
        }
        Err(error) => Err(error.into()),
    }
}

/// Checks credentials and opens a session.
///
/// # Errors
///
/// Returns `InvalidCredentials` for an unknown e-mail or a wrong password
/// without telling the two apart.
pub async fn login(
    dependencies: &AppDependencies,
    email: &str,
    password: &str,
    remember_me: bool,
) -> ServiceResult<LoginOutcome> {
    let credentials = validate_login(email, password)?;

    let Some(user) = dependencies
        .repositories()
        .users
        .find_user_by_email(&credentials.email)
        .await?
    else {
        warn!(email = %credentials.email, "Login failed");
        return Err(DomainError::InvalidCredentials.into());
    };

    let hasher = password_hasher(dependencies);
    let password = credentials.password;
    let stored = user.password_hash.clone();
    let verified = run_blocking(move || hasher.verify(&password, &stored)).await?;
    if !verified {
        warn!(email = %credentials.email, "Login failed");
        return Err(DomainError::InvalidCredentials.into());
    }

    let config = dependencies.config();
    let now = Utc::now();
    let lifetime = if remember_me {
        Duration::try_days(i64::from(config.remember_me_ttl_days))
    } else {
        Duration::try_hours(i64::from(config.session_ttl_hours))
    };
    let expires_at = lifetime
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            ServiceError::Internal(format!(
                "session lifetime out of range (remember_me={remember_me})"
            ))
        })?;

    let token = generate_session_token();
    let session = Session {
        token_digest: token_digest(&config.secret_key, &token),
        user_id: user.id,
        created_at: now,
        expires_at,
        remember_me,
    };
    dependencies
        .repositories()
        .sessions
        .insert_session(&session)
        .await?;

    info!(user_id = %user.id, remember_me, "User logged in");
    Ok(LoginOutcome {
        token,
        expires_at: session.expires_at,
        remember_me,
        user,
    })
}

/// Ends the session identified by `token`. Unknown tokens are ignored.
///
/// # Errors
///
/// Returns a repository error if the session cannot be deleted.
pub async fn logout(dependencies: &AppDependencies, token: &str) -> ServiceResult<()> {
    let digest = token_digest(&dependencies.config().secret_key, token);
    let deleted = dependencies
        .repositories()
        .sessions
        .delete_session(&digest)
        .await?;
    debug!(deleted, "Session closed");
    Ok(())
}

/// Resolves a bearer token to its user.
///
/// Expired sessions are deleted on sight.
///
/// # Errors
///
/// Returns `Unauthenticated` for an unknown or expired token, or when the
/// session's user no longer exists.
pub async fn current_user(dependencies: &AppDependencies, token: &str) -> ServiceResult<User> {
    let repositories = dependencies.repositories();
    let digest = token_digest(&dependencies.config().secret_key, token);

    let Some(session) = repositories.sessions.find_session(&digest).await? else {
        debug!("Unknown session token");
        return Err(DomainError::Unauthenticated.into());
    };

    if session.is_expired(Utc::now()) {
        repositories.sessions.delete_session(&digest).await?;
        debug!(user_id = %session.user_id, "Expired session removed");
        return Err(DomainError::Unauthenticated.into());
    }

    repositories
        .users
        .find_user_by_id(session.user_id)
        .await?
        .ok_or_else(|| DomainError::Unauthenticated.into())
}

/// Deletes every expired session.
///
/// # Errors
///
/// Returns a repository error if the sweep fails.
pub async fn purge_expired_sessions(dependencies: &AppDependencies) -> ServiceResult<u64> {
    let removed = dependencies
        .repositories()
        .sessions
        .delete_expired_sessions(Utc::now())
        .await?;
    if removed > 0 {
        info!(removed, "Expired sessions purged");
    }
    Ok(removed)
}
