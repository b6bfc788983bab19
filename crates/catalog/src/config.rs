//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PARLOUR_DATABASE_PATH` - Path of the `SQLite` catalog file
//!   (default: `ice_cream_cafe.db`)
//!
//! A `.env` file in the working directory is read first, if present.

use std::path::PathBuf;

use thiserror::Error;

/// Environment variable naming the catalog database file.
pub const DATABASE_PATH_VAR: &str = "PARLOUR_DATABASE_PATH";

/// Database file used when [`DATABASE_PATH_VAR`] is not set.
pub const DEFAULT_DATABASE_PATH: &str = "ice_cream_cafe.db";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Catalog configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Path of the `SQLite` catalog file
    pub database_path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from the process environment (after `.env`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match lookup(DATABASE_PATH_VAR) {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidEnvVar(
                    DATABASE_PATH_VAR.to_owned(),
                    "path cannot be empty".to_owned(),
                ));
            }
            Some(value) => PathBuf::from(value.trim()),
            None => PathBuf::from(DEFAULT_DATABASE_PATH),
        };

        Ok(Self { database_path })
    }

    /// Replace the database path, e.g. from a command-line flag.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }
}
