//! Core types for Parlour.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod name;
pub mod price;

pub use id::*;
pub use name::{Name, NameError};
pub use price::{Price, PriceError};
