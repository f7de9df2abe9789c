//! Repository factory for runtime backend selection.
//!
//! Chooses between the in-memory store and `SQLite` according to
//! `STORAGE_MODE`.
//!
//! # Example
//!
//! ```ignore
//! use family_groups::infrastructure::{AppConfig, RepositoryFactory};
//!
//! let config = AppConfig::from_env()?;
//! let repositories = RepositoryFactory::from_config(&config).create().await?;
//! ```

use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use super::config::AppConfig;
use super::{InMemoryStore, Repositories, RepositoryError, SqliteStore};

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage backend for all repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage. Data is lost on restart.
    InMemory,
    /// `SQLite` database, the system of record.
    #[default]
    Sqlite,
}

/// Error returned for an unrecognized `STORAGE_MODE`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown storage mode '{0}', expected 'in_memory' or 'sqlite'")]
pub struct UnknownStorageMode(pub String);

impl FromStr for StorageMode {
    type Err = UnknownStorageMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(UnknownStorageMode(value.to_string())),
        }
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// The database could not be opened or bootstrapped.
    #[error("Failed to initialize storage: {0}")]
    Storage(#[from] RepositoryError),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Builds the [`Repositories`] bundle for a storage mode.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    storage_mode: StorageMode,
    database_url: String,
}

impl RepositoryFactory {
    #[must_use]
    pub fn new(storage_mode: StorageMode, database_url: impl Into<String>) -> Self {
        Self {
            storage_mode,
            database_url: database_url.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.storage_mode, config.database_url.clone())
    }

    #[must_use]
    pub const fn storage_mode(&self) -> StorageMode {
        self.storage_mode
    }

    /// Creates the repositories for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError::Storage` if the `SQLite` database cannot be
    /// opened or its schema cannot be created.
    pub async fn create(&self) -> Result<Repositories, FactoryError> {
        match self.storage_mode {
            StorageMode::InMemory => {
                info!("Using in-memory storage");
                Ok(Repositories::from_store(InMemoryStore::new()))
            }
            StorageMode::Sqlite => {
                info!(database_url = %self.database_url, "Using SQLite storage");
                let store = SqliteStore::connect(&self.database_url).await?;
                Ok(Repositories::from_store(store))
            }
        }
    }
}
