//! Seed the catalog from a YAML menu file.
//!
//! # File Format
//!
//! ```yaml
//! allergens:
//!   - Milk
//! ingredients:
//!   - name: Vanilla Beans
//!     quantity: 100
//!     unit: grams        # optional, defaults to grams
//! flavors:
//!   - name: Classic Vanilla
//!     description: Traditional favorite   # optional
//!     seasonal: false                     # optional
//!     price: "3.99"                       # quote prices to keep them exact
//!     allergens: [Milk]                   # optional, must exist
//! ```
//!
//! Records whose name already exists are skipped, so seeding is repeatable.

use std::path::Path;

use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;

use parlour_core::Name;

use crate::db::{CatalogRepository, RepositoryError};
use crate::models::{NewFlavor, NewIngredient};

/// The built-in demo menu.
pub const DEMO_MENU: &str = include_str!("../seed/demo_menu.yaml");

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The menu file could not be read.
    #[error("cannot read menu file: {0}")]
    Io(#[from] std::io::Error),

    /// The menu file is not valid YAML for a menu.
    #[error("invalid menu: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A record could not be written.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A menu to seed the catalog with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Menu {
    /// Allergen names.
    #[serde(default)]
    pub allergens: Vec<Name>,
    /// Ingredients with initial stock.
    #[serde(default)]
    pub ingredients: Vec<NewIngredient>,
    /// Flavors, which may reference allergens by name.
    #[serde(default)]
    pub flavors: Vec<NewFlavor>,
}

impl Menu {
    /// Parse a menu from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the text is not a valid menu.
    pub fn parse(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a menu file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Io` if the file cannot be read and
    /// `SeedError::Yaml` if it is not a valid menu.
    pub async fn load(path: &Path) -> Result<Self, SeedError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// The built-in demo menu.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the embedded menu is invalid.
    pub fn demo() -> Result<Self, SeedError> {
        Self::parse(DEMO_MENU)
    }

    /// Total number of records in the menu.
    #[must_use]
    pub fn len(&self) -> usize {
        self.allergens.len() + self.ingredients.len() + self.flavors.len()
    }

    /// Returns `true` if the menu has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Records inserted.
    pub inserted: usize,
    /// Records skipped because the name already existed.
    pub skipped: usize,
}

impl SeedReport {
    fn record<T>(&mut self, result: Result<T, RepositoryError>) -> Result<(), RepositoryError> {
        match result {
            Ok(_) => self.inserted += 1,
            Err(RepositoryError::DuplicateName { kind, name }) => {
                tracing::debug!(%kind, %name, "Already exists, skipping");
                self.skipped += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

/// Insert every record of `menu` that does not exist yet.
///
/// Allergens go in first so flavors can reference them.
///
/// # Errors
///
/// Returns `SeedError::Repository` on the first record that fails for a
/// reason other than already existing. Records inserted before it are kept.
pub async fn seed(pool: &SqlitePool, menu: &Menu) -> Result<SeedReport, SeedError> {
    let catalog = CatalogRepository::new(pool);
    let mut report = SeedReport::default();

    for allergen in &menu.allergens {
        report.record(catalog.add_allergen(allergen).await)?;
    }

    for ingredient in &menu.ingredients {
        report.record(catalog.add_ingredient(ingredient).await)?;
    }

    for flavor in &menu.flavors {
        report.record(catalog.add_flavor(flavor).await)?;
    }

    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "Seeding complete"
    );

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_menu_parses() {
        let menu = Menu::demo().unwrap();
        assert!(!menu.is_empty());
        assert!(menu.flavors.iter().any(|f| f.is_seasonal));
        assert!(menu.flavors.iter().any(|f| !f.is_seasonal));
    }

    #[test]
    fn test_parse_defaults() {
        let menu = Menu::parse(
            r#"
flavors:
  - name: Mint Chip
    price: "4.50"
ingredients:
  - name: Cream
    quantity: 10
"#,
        )
        .unwrap();

        let flavor = &menu.flavors[0];
        assert_eq!(flavor.name.as_str(), "Mint Chip");
        assert_eq!(flavor.price.cents(), 450);
        assert!(!flavor.is_seasonal);
        assert!(flavor.description.is_empty());
        assert!(flavor.allergens.is_empty());

        assert_eq!(menu.ingredients[0].unit, NewIngredient::DEFAULT_UNIT);
        assert!(menu.allergens.is_empty());
    }

    #[test]
    fn test_parse_rejects_negative_price() {
        let result = Menu::parse(
            r#"
flavors:
  - name: Mint Chip
    price: "-1.00"
"#,
        );
        assert!(matches!(result, Err(SeedError::Yaml(_))));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let result = Menu::load(Path::new("no/such/menu.yaml")).await;
        assert!(matches!(result, Err(SeedError::Io(_))));
    }

    #[test]
    fn test_empty_menu() {
        let menu = Menu::parse("allergens: []
").unwrap();
        assert!(menu.is_empty());
        assert_eq!(menu.len(), 0);
    }

    #[test]
    fn test_parse_rejects_unknown_section() {
        let result = Menu::parse("toppings: [sprinkles]\n");
        assert!(matches!(result, Err(SeedError::Yaml(_))));
    }
}
