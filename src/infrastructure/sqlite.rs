//! `SQLite` repository implementation.
//!
//! Provides [`SqliteStore`], an `sqlx`-backed implementation of every
//! repository trait. It is the system of record in production
//! (`STORAGE_MODE=sqlite`).
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     email TEXT NOT NULL UNIQUE,
//!     password_hash TEXT NOT NULL,
//!     created_at TEXT NOT NULL
//! );
//!
//! CREATE TABLE family_groups (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name TEXT NOT NULL,
//!     created_at TEXT NOT NULL
//! );
//!
//! CREATE TABLE group_members (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     group_id INTEGER NOT NULL REFERENCES family_groups(id) ON DELETE CASCADE,
//!     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     role TEXT NOT NULL DEFAULT 'member',
//!     joined_at TEXT NOT NULL,
//!     UNIQUE (group_id, user_id)
//! );
//!
//! CREATE TABLE tasks (...);
//! CREATE TABLE sessions (...);
//! ```
//!
//! The last-admin rule is enforced inside the `DELETE`/`UPDATE` statement
//! itself so that two admins demoting each other concurrently cannot leave a
//! group without one. Task writes check the assignee's membership the same
//! way, so a task is never assigned to someone who has just left the group.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::{debug, info};

use crate::domain::{
    FamilyGroup, GroupId, GroupSummary, MemberSummary, Membership, NewTask, Role, Session, Task,
    TaskFilter, TaskId, TaskStatusFilter, TaskUpdate, User, UserId,
};
use crate::infrastructure::{
    GroupRepository, MembershipWrite, RepositoryError, SessionRepository, TaskRepository,
    TaskWrite, UserRepository,
};

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        Self::DatabaseError(error.to_string())
    }
}

/// Maps a unique-constraint violation to `Duplicate`, a foreign-key violation
/// to `MissingReference`, anything else to `DatabaseError`.
fn map_write_error(error: sqlx::Error, entry: impl Into<String>) -> RepositoryError {
    match &error {
        sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
            RepositoryError::Duplicate(entry.into())
        }
        sqlx::Error::Database(database_error) if database_error.is_foreign_key_violation() => {
            RepositoryError::MissingReference(entry.into())
        }
        _ => RepositoryError::from(error),
    }
}

const SCHEMA: [&str; 9] = [
    r"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS family_groups (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS group_members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_id INTEGER NOT NULL REFERENCES family_groups(id) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        role TEXT NOT NULL DEFAULT 'member' CHECK (role IN ('admin', 'member')),
        joined_at TEXT NOT NULL,
        UNIQUE (group_id, user_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        group_id INTEGER NOT NULL REFERENCES family_groups(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT,
        assignee_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
        created_by INTEGER NOT NULL REFERENCES users(id),
        completed INTEGER NOT NULL DEFAULT 0,
        due_date TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS sessions (
        token_digest TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL,
        remember_me INTEGER NOT NULL DEFAULT 0
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_group_members_user ON group_members (user_id)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_group ON tasks (group_id, completed, id)",
    "CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks (assignee_id, completed)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions (expires_at)",
];

// =============================================================================
// Row decoding
// =============================================================================

fn parse_role(value: &str) -> Result<Role, RepositoryError> {
    value
        .parse()
        .map_err(|error: crate::domain::group::UnknownRole| {
            RepositoryError::CorruptRow(error.to_string())
        })
}

fn user_from_row(row: &SqliteRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn group_from_row(row: &SqliteRow) -> Result<FamilyGroup, RepositoryError> {
    Ok(FamilyGroup {
        id: GroupId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

fn membership_from_row(row: &SqliteRow) -> Result<Membership, RepositoryError> {
    Ok(Membership {
        group_id: GroupId::new(row.try_get("group_id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        role: parse_role(row.try_get("role")?)?,
        joined_at: row.try_get("joined_at")?,
    })
}

fn task_from_row(row: &SqliteRow) -> Result<Task, RepositoryError> {
    let assignee_id: Option<i64> = row.try_get("assignee_id")?;
    Ok(Task {
        id: TaskId::new(row.try_get("id")?),
        group_id: GroupId::new(row.try_get("group_id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        assignee_id: assignee_id.map(UserId::new),
        created_by: UserId::new(row.try_get("created_by")?),
        completed: row.try_get("completed")?,
        due_date: row.try_get("due_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn session_from_row(row: &SqliteRow) -> Result<Session, RepositoryError> {
    Ok(Session {
        token_digest: row.try_get("token_digest")?,
        user_id: UserId::new(row.try_get("user_id")?),
        created_at: row.try_get("created_at")?,
        expires_at: row.try_get("expires_at")?,
        remember_me: row.try_get("remember_me")?,
    })
}

const TASK_COLUMNS: &str = "id, group_id, title, description, assignee_id, created_by, \
                            completed, due_date, created_at, updated_at";

// =============================================================================
// SQLite Store
// =============================================================================

/// `SQLite` implementation of all repository traits.
///
/// # Example
///
/// ```ignore
/// use family_groups::infrastructure::{Repositories, SqliteStore};
///
/// let store = SqliteStore::connect("sqlite://site.db").await?;
/// let repositories = Repositories::from_store(store);
/// ```
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wraps an existing pool. The schema is not created; call
    /// [`SqliteStore::migrate`] when needed.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `database_url` and
    /// bootstraps the schema.
    ///
    /// In-memory URLs get a single long-lived connection, since every
    /// `SQLite` connection to `:memory:` opens its own empty database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the URL is invalid, the
    /// database cannot be opened, or the schema cannot be created.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        info!(database_url, "Opening SQLite database");

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Creates tables and indexes that do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if a statement fails.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        debug!("Running database schema bootstrap");
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Database schema bootstrap completed");
        Ok(())
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<User, RepositoryError> {
        let result =
            sqlx::query("INSERT INTO users (email, password_hash, created_at) VALUES (?1, ?2, ?3)")
                .bind(email)
                .bind(password_hash)
                .bind(created_at)
                .execute(&self.pool)
                .await
                .map_err(|error| map_write_error(error, format!("user.email={email}")))?;

        Ok(User {
            id: UserId::new(result.last_insert_rowid()),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_user_by_id(&self, user_id: UserId) -> Result<Option<User>, RepositoryError> {
        sqlx::query("SELECT id, email, password_hash, created_at FROM users WHERE id = ?1")
            .bind(user_id.value())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }
}

#[async_trait]
impl GroupRepository for SqliteStore {
    async fn create_group_with_admin(
        &self,
        name: &str,
        admin: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<(FamilyGroup, Membership), RepositoryError> {
        let mut transaction = self.pool.begin().await?;

        let group_id = sqlx::query("INSERT INTO family_groups (name, created_at) VALUES (?1, ?2)")
            .bind(name)
            .bind(created_at)
            .execute(&mut *transaction)
            .await?
            .last_insert_rowid();

        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(group_id)
        .bind(admin.value())
        .bind(Role::Admin.as_str())
        .bind(created_at)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;

        let group = FamilyGroup {
            id: GroupId::new(group_id),
            name: name.to_string(),
            created_at,
        };
        let membership = Membership {
            group_id: group.id,
            user_id: admin,
            role: Role::Admin,
            joined_at: created_at,
        };
        Ok((group, membership))
    }

    async fn find_group(&self, group_id: GroupId) -> Result<Option<FamilyGroup>, RepositoryError> {
        sqlx::query("SELECT id, name, created_at FROM family_groups WHERE id = ?1")
            .bind(group_id.value())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(group_from_row)
            .transpose()
    }

    async fn rename_group(&self, group_id: GroupId, name: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE family_groups SET name = ?1 WHERE id = ?2")
            .bind(name)
            .bind(group_id.value())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_group(&self, group_id: GroupId) -> Result<bool, RepositoryError> {
        let mut transaction = self.pool.begin().await?;

        for statement in [
            "DELETE FROM tasks WHERE group_id = ?1",
            "DELETE FROM group_members WHERE group_id = ?1",
        ] {
            sqlx::query(statement)
                .bind(group_id.value())
                .execute(&mut *transaction)
                .await?;
        }
        let deleted = sqlx::query("DELETE FROM family_groups WHERE id = ?1")
            .bind(group_id.value())
            .execute(&mut *transaction)
            .await?
            .rows_affected();

        transaction.commit().await?;
        Ok(deleted > 0)
    }

    async fn list_groups_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<GroupSummary>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT g.id, g.name, g.created_at, m.role,
                   (SELECT COUNT(*) FROM group_members c WHERE c.group_id = g.id) AS member_count
            FROM group_members m
            JOIN family_groups g ON g.id = m.group_id
            WHERE m.user_id = ?1
            ORDER BY g.id
            ",
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let member_count: i64 = row.try_get("member_count")?;
                Ok(GroupSummary {
                    group: group_from_row(row)?,
                    role: parse_role(row.try_get("role")?)?,
                    member_count: member_count.unsigned_abs(),
                })
            })
            .collect()
    }

    async fn find_membership(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<Option<Membership>, RepositoryError> {
        sqlx::query(
            "SELECT group_id, user_id, role, joined_at FROM group_members \
             WHERE group_id = ?1 AND user_id = ?2",
        )
        .bind(group_id.value())
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(membership_from_row)
        .transpose()
    }

    async fn list_members(&self, group_id: GroupId) -> Result<Vec<MemberSummary>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.email, m.role, m.joined_at
            FROM group_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.group_id = ?1
            ORDER BY m.joined_at, u.id
            ",
        )
        .bind(group_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(MemberSummary {
                    user_id: UserId::new(row.try_get("id")?),
                    email: row.try_get("email")?,
                    role: parse_role(row.try_get("role")?)?,
                    joined_at: row.try_get("joined_at")?,
                })
            })
            .collect()
    }

    async fn add_membership(&self, membership: &Membership) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO group_members (group_id, user_id, role, joined_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(membership.group_id.value())
        .bind(membership.user_id.value())
        .bind(membership.role.as_str())
        .bind(membership.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(
                error,
                format!(
                    "group_member=({}, {})",
                    membership.group_id, membership.user_id
                ),
            )
        })?;
        Ok(())
    }

    async fn remove_membership(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> Result<MembershipWrite, RepositoryError> {
        let mut transaction = self.pool.begin().await?;

        let removed = sqlx::query(
            r"
            DELETE FROM group_members
            WHERE group_id = ?1 AND user_id = ?2
              AND (role <> 'admin'
                   OR (SELECT COUNT(*) FROM group_members
                       WHERE group_id = ?1 AND role = 'admin') > 1)
            ",
        )
        .bind(group_id.value())
        .bind(user_id.value())
        .execute(&mut *transaction)
        .await?
        .rows_affected();

        if removed == 0 {
            let exists =
                sqlx::query("SELECT 1 FROM group_members WHERE group_id = ?1 AND user_id = ?2")
                    .bind(group_id.value())
                    .bind(user_id.value())
                    .fetch_optional(&mut *transaction)
                    .await?
                    .is_some();
            transaction.rollback().await?;
            return Ok(if exists {
                MembershipWrite::WouldOrphanGroup
            } else {
                MembershipWrite::NotFound
            });
        }

        sqlx::query("UPDATE tasks SET assignee_id = NULL WHERE group_id = ?1 AND assignee_id = ?2")
            .bind(group_id.value())
            .bind(user_id.value())
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;
        Ok(MembershipWrite::Applied)
    }

    async fn change_role(
        &self,
        group_id: GroupId,
        user_id: UserId,
        role: Role,
    ) -> Result<MembershipWrite, RepositoryError> {
        let mut transaction = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE group_members SET role = ?3
            WHERE group_id = ?1 AND user_id = ?2
              AND (?3 = 'admin'
                   OR role <> 'admin'
                   OR (SELECT COUNT(*) FROM group_members
                       WHERE group_id = ?1 AND role = 'admin') > 1)
            ",
        )
        .bind(group_id.value())
        .bind(user_id.value())
        .bind(role.as_str())
        .execute(&mut *transaction)
        .await?
        .rows_affected();

        let outcome = if updated > 0 {
            MembershipWrite::Applied
        } else if sqlx::query("SELECT 1 FROM group_members WHERE group_id = ?1 AND user_id = ?2")
            .bind(group_id.value())
            .bind(user_id.value())
            .fetch_optional(&mut *transaction)
            .await?
            .is_some()
        {
            MembershipWrite::WouldOrphanGroup
        } else {
            MembershipWrite::NotFound
        };

        transaction.commit().await?;
        Ok(outcome)
    }
}

#[async_trait]
impl TaskRepository for SqliteStore {
    async fn insert_task(&self, task: NewTask) -> Result<TaskWrite, RepositoryError> {
        let mut transaction = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            INSERT INTO tasks
                (group_id, title, description, assignee_id, created_by, completed,
                 due_date, created_at, updated_at)
            SELECT ?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?7
            WHERE EXISTS (SELECT 1 FROM family_groups WHERE id = ?1)
              AND (?4 IS NULL
                   OR EXISTS (SELECT 1 FROM group_members
                              WHERE group_id = ?1 AND user_id = ?4))
            ",
        )
        .bind(task.group_id.value())
        .bind(&task.title)
        .bind(task.description.as_deref())
        .bind(task.assignee_id.map(UserId::value))
        .bind(task.created_by.value())
        .bind(task.due_date)
        .bind(task.created_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_write_error(error, format!("task.group_id={}", task.group_id)))?;

        if result.rows_affected() == 0 {
            let group_exists = sqlx::query("SELECT 1 FROM family_groups WHERE id = ?1")
                .bind(task.group_id.value())
                .fetch_optional(&mut *transaction)
                .await?
                .is_some();
            transaction.rollback().await?;
            return Ok(if group_exists {
                TaskWrite::AssigneeNotMember
            } else {
                TaskWrite::NotFound
            });
        }

        transaction.commit().await?;
        let id = TaskId::new(result.last_insert_rowid());
        Ok(TaskWrite::Applied(task.into_task(id)))
    }

    async fn find_task(
        &self,
        group_id: GroupId,
        task_id: TaskId,
    ) -> Result<Option<Task>, RepositoryError> {
        sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND group_id = ?2"
        ))
        .bind(task_id.value())
        .bind(group_id.value())
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(task_from_row)
        .transpose()
    }

    async fn list_tasks(
        &self,
        group_id: GroupId,
        filter: TaskFilter,
    ) -> Result<Vec<Task>, RepositoryError> {
        let completed = match filter.status {
            TaskStatusFilter::Open => Some(false),
            TaskStatusFilter::Completed => Some(true),
            TaskStatusFilter::All => None,
        };

        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE group_id = ?1 \
               AND (?2 IS NULL OR assignee_id = ?2) \
               AND (?3 IS NULL OR completed = ?3) \
             ORDER BY completed, id"
        ))
        .bind(group_id.value())
        .bind(filter.assignee_id.map(UserId::value))
        .bind(completed)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    async fn list_open_tasks_for_assignee(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE assignee_id = ?1 AND completed = 0 \
             ORDER BY id"
        ))
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    async fn update_task(
        &self,
        group_id: GroupId,
        task_id: TaskId,
        update: &TaskUpdate,
    ) -> Result<TaskWrite, RepositoryError> {
        let mut transaction = self.pool.begin().await?;

        let updated = sqlx::query(
            r"
            UPDATE tasks
            SET title = COALESCE(?3, title),
                description = CASE WHEN ?4 THEN ?5 ELSE description END,
                due_date = CASE WHEN ?6 THEN ?7 ELSE due_date END,
                assignee_id = CASE WHEN ?8 THEN ?9 ELSE assignee_id END,
                completed = COALESCE(?10, completed),
                updated_at = ?11
            WHERE id = ?1 AND group_id = ?2
              AND (?9 IS NULL
                   OR EXISTS (SELECT 1 FROM group_members
                              WHERE group_id = ?2 AND user_id = ?9))
            ",
        )
        .bind(task_id.value())
        .bind(group_id.value())
        .bind(update.title.as_deref())
        .bind(update.description.is_some())
        .bind(update.description.as_ref().and_then(Option::as_deref))
        .bind(update.due_date.is_some())
        .bind(update.due_date.flatten())
        .bind(update.assignee_id.is_some())
        .bind(update.new_assignee().map(UserId::value))
        .bind(update.completed)
        .bind(update.updated_at)
        .execute(&mut *transaction)
        .await?
        .rows_affected();

        let row = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND group_id = ?2"
        ))
        .bind(task_id.value())
        .bind(group_id.value())
        .fetch_optional(&mut *transaction)
        .await?;

        let outcome = match row {
            None => TaskWrite::NotFound,
            Some(_) if updated == 0 => TaskWrite::AssigneeNotMember,
            Some(row) => TaskWrite::Applied(task_from_row(&row)?),
        };

        transaction.commit().await?;
        Ok(outcome)
    }

    async fn delete_task(
        &self,
        group_id: GroupId,
        task_id: TaskId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1 AND group_id = ?2")
            .bind(task_id.value())
            .bind(group_id.value())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl SessionRepository for SqliteStore {
    async fn insert_session(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO sessions (token_digest, user_id, created_at, expires_at, remember_me) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&session.token_digest)
        .bind(session.user_id.value())
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.remember_me)
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, "session.token_digest"))?;
        Ok(())
    }

    async fn find_session(&self, token_digest: &str) -> Result<Option<Session>, RepositoryError> {
        sqlx::query(
            "SELECT token_digest, user_id, created_at, expires_at, remember_me \
             FROM sessions WHERE token_digest = ?1",
        )
        .bind(token_digest)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(session_from_row)
        .transpose()
    }

    async fn delete_session(&self, token_digest: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_digest = ?1")
            .bind(token_digest)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
