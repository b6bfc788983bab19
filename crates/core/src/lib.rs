//! Parlour Core - Shared domain types.
//!
//! This crate provides the value types used across all Parlour components:
//! - `catalog` - Storage layer, catalog/cart managers and flavor search
//! - `cli` - The `parlour` command-line tool
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access. Values are
//! validated on construction so the storage layer can trust them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and names

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
