//! Dependency container shared by every request handler.
//!
//! `AppDependencies` is the axum router state. It is cheap to clone: the
//! configuration sits behind an `Arc` and the repositories are trait objects.
//!
//! # Example
//!
//! ```rust,ignore
//! use family_groups::infrastructure::{AppConfig, AppDependencies, RepositoryFactory};
//!
//! let config = AppConfig::from_env()?;
//! let repositories = RepositoryFactory::from_config(&config).create().await?;
//! let dependencies = AppDependencies::new(config, repositories);
//! ```

use std::sync::Arc;

use super::config::AppConfig;
use super::in_memory::InMemoryStore;
use super::repository::Repositories;

/// Application dependency container.
#[derive(Clone)]
pub struct AppDependencies {
    config: Arc<AppConfig>,
    repositories: Repositories,
}

impl AppDependencies {
    #[must_use]
    pub fn new(config: AppConfig, repositories: Repositories) -> Self {
        Self {
            config: Arc::new(config),
            repositories,
        }
    }

    /// Dependencies backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(config, Repositories::from_store(InMemoryStore::new()))
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub const fn repositories(&self) -> &Repositories {
        &self.repositories
    }
}

impl std::fmt::Debug for AppDependencies {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppDependencies")
            .field("storage_mode", &self.config.storage_mode)
            .field("app_port", &self.config.app_port)
            .field("repositories", &self.repositories)
            .finish_non_exhaustive()
    }
}
