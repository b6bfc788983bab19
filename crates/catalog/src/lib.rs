//! Parlour Catalog - flavor catalog, ingredient inventory and cart.
//!
//! # Architecture
//!
//! - [`db::Store`] opens the `SQLite` file and applies migrations
//! - [`db::CatalogRepository`] adds, edits and removes flavors, ingredients and allergens
//! - [`db::CartRepository`] manages the cart and prices it at current flavor prices
//! - [`db::FlavorSearch`] filters flavors (read-only)
//! - [`seed`] loads a YAML menu into the catalog
//!
//! Repositories borrow the store's pool; each operation is one transaction.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod seed;

pub use config::{CatalogConfig, ConfigError};
pub use db::{
    CartRepository, CatalogRepository, EntityKind, FlavorSearch, RepositoryError, Store,
};
pub use models::*;
pub use seed::{Menu, SeedError, SeedReport};
