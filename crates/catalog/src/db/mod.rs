//! Database operations for the catalog `SQLite` store.
//!
//! # Tables
//!
//! - `flavors` - Sellable flavors (name unique, price in integer cents)
//! - `ingredients` - Ingredient stock levels (name unique, quantity >= 0)
//! - `allergens` - Allergen names (unique)
//! - `flavor_allergens` - Flavor/allergen tags (cascade on delete of either side)
//! - `cart` - One entry per flavor with a positive quantity
//!
//! # Migrations
//!
//! Migrations are stored in `crates/catalog/migrations/`, embedded at compile
//! time and applied by [`Store::open`].
//!
//! # Usage
//!
//! ```rust,ignore
//! let store = Store::open("ice_cream_cafe.db").await?;
//! let catalog = CatalogRepository::new(store.pool());
//! catalog.add_allergen(&Name::parse("Peanuts")?).await?;
//! store.close().await;
//! ```

pub mod cart;
pub mod catalog;
pub mod search;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

use parlour_core::{Name, NameError, PriceError};

use crate::config::CatalogConfig;

pub use cart::CartRepository;
pub use catalog::CatalogRepository;
pub use search::FlavorSearch;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// How long a connection waits for another process's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Flavor,
    Ingredient,
    Allergen,
    AllergenTag,
    CartItem,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flavor => "flavor",
            Self::Ingredient => "ingredient",
            Self::Allergen => "allergen",
            Self::AllergenTag => "allergen tag",
            Self::CartItem => "cart item",
        })
    }
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A record with this name already exists.
    #[error("{kind} already exists: {name}")]
    DuplicateName {
        /// Table the collision happened in.
        kind: EntityKind,
        /// The colliding name.
        name: String,
    },

    /// The referenced record does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Table that was searched.
        kind: EntityKind,
        /// The name that was looked up.
        name: String,
    },

    /// A price, quantity or name is out of range.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl RepositoryError {
    pub(crate) fn duplicate(kind: EntityKind, name: &Name) -> Self {
        Self::DuplicateName {
            kind,
            name: name.to_string(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, name: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    /// Map a unique-index violation to [`RepositoryError::DuplicateName`].
    ///
    /// The pre-insert existence checks report duplicates first; this covers a
    /// row inserted by another process between the check and the insert.
    pub(crate) fn from_insert(err: sqlx::Error, kind: EntityKind, name: &Name) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::duplicate(kind, name);
        }
        Self::Database(err)
    }
}

impl From<PriceError> for RepositoryError {
    fn from(err: PriceError) -> Self {
        Self::InvalidValue(err.to_string())
    }
}

impl From<NameError> for RepositoryError {
    fn from(err: NameError) -> Self {
        Self::InvalidValue(err.to_string())
    }
}

/// Parse a name read back from the database.
pub(crate) fn stored_name(raw: &str) -> Result<Name, RepositoryError> {
    Name::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid name in database: {e}")))
}

/// Handle to the catalog database file.
///
/// The store owns a single-connection pool, so operations run one at a time
/// and writers are serialized. Repositories borrow the pool from the store.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database at `path` and apply pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the file cannot be opened and
    /// `RepositoryError::Migration` if the schema cannot be brought up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;
        tracing::debug!(path = %path.display(), "Catalog store opened");

        Ok(Self { pool })
    }

    /// Open the database named by `config`.
    ///
    /// # Errors
    ///
    /// See [`Store::open`].
    pub async fn from_config(config: &CatalogConfig) -> Result<Self, RepositoryError> {
        Self::open(&config.database_path).await
    }

    /// The connection pool, for constructing repositories.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for the connection to be released.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::debug!("Catalog store closed");
    }
}
