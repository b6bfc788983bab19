//! Command implementations.
//!
//! Each command borrows the open [`parlour_catalog::Store`], runs one
//! repository operation and renders the result through [`crate::output::Output`].

pub mod cart;
pub mod catalog;
pub mod search;
pub mod seed;

/// Result type shared by all commands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;
