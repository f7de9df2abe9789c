//! Infrastructure layer.
//!
//! Everything that touches the outside world: configuration, the repository
//! traits and their backends, and the dependency container handed to the
//! HTTP layer.
//!
//! - [`config`]: environment-driven [`AppConfig`]
//! - [`repository`]: repository traits and the [`Repositories`] bundle
//! - [`in_memory`]: process-local store for tests and development
//! - [`sqlite`]: `sqlx`-backed `SQLite` store
//! - [`factory`]: picks a backend from [`StorageMode`]
//! - [`dependencies`]: [`AppDependencies`], the router state

pub mod config;
pub mod dependencies;
pub mod factory;
pub mod in_memory;
pub mod repository;
pub mod sqlite;

pub use config::{AppConfig, ConfigError};
pub use dependencies::AppDependencies;
pub use factory::{FactoryError, RepositoryFactory, StorageMode, UnknownStorageMode};
pub use in_memory::InMemoryStore;
pub use repository::{
    GroupRepository, MembershipWrite, Repositories, RepositoryError, SessionRepository,
    TaskRepository, TaskWrite, UserRepository,
};
pub use sqlite::SqliteStore;
