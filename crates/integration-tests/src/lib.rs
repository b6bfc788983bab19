//! Integration tests for Parlour.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p parlour-integration-tests
//! ```
//!
//! Every test opens a fresh `SQLite` file in its own temporary directory, so
//! tests are independent and need no external database.
//!
//! # Test Categories
//!
//! - `catalog` - Flavor, ingredient and allergen CRUD and constraints
//! - `cart` - Cart merging, removal and exact totals
//! - `search` - Flavor filtering and ordering
//! - `store` - Persistence, migrations and seeding

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::path::PathBuf;

use sqlx::SqlitePool;
use tempfile::TempDir;

use parlour_catalog::{CartRepository, CatalogRepository, FlavorSearch, NewFlavor, Store};
use parlour_core::{FlavorId, Name, Price};

/// A store backed by a file in a temporary directory that lives as long as
/// the context.
pub struct TestContext {
    pub store: Store,
    dir: TempDir,
}

impl TestContext {
    /// Open a fresh, migrated store.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = Store::open(dir.path().join("catalog.db"))
            .await
            .expect("open store");
        Self { store, dir }
    }

    /// Path of the database file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.dir.path().join("catalog.db")
    }

    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        self.store.pool()
    }

    #[must_use]
    pub const fn catalog(&self) -> CatalogRepository<'_> {
        CatalogRepository::new(self.store.pool())
    }

    #[must_use]
    pub const fn cart(&self) -> CartRepository<'_> {
        CartRepository::new(self.store.pool())
    }

    #[must_use]
    pub const fn search(&self) -> FlavorSearch<'_> {
        FlavorSearch::new(self.store.pool())
    }

    /// Add a flavor with no description.
    pub async fn flavor(
        &self,
        name: &str,
        seasonal: bool,
        price: &str,
        allergens: &[&str],
    ) -> FlavorId {
        let mut input = NewFlavor::new(self::name(name), seasonal, self::price(price));
        for allergen in allergens {
            input = input.with_allergen(self::name(allergen));
        }
        self.catalog()
            .add_flavor(&input)
            .await
            .expect("add flavor")
    }

    /// Add an allergen.
    pub async fn allergen(&self, name: &str) {
        self.catalog()
            .add_allergen(&self::name(name))
            .await
            .expect("add allergen");
    }

    /// Count rows in `table`.
    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.pool())
            .await
            .expect("count rows")
    }
}

/// Parse a name, panicking on invalid input.
#[must_use]
pub fn name(s: &str) -> Name {
    Name::parse(s).expect("valid name")
}

/// Parse a price, panicking on invalid input.
#[must_use]
pub fn price(s: &str) -> Price {
    Price::parse(s).expect("valid price")
}
