//! Seed the catalog from a YAML menu.
//!
//! Without `--file` the built-in demo menu is loaded.

use std::path::Path;

use serde_json::json;
use tracing::{info, warn};

use parlour_catalog::{Menu, Store, seed};

use super::CommandResult;
use crate::output::Output;

/// Seed from `file`, or from the demo menu.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or a record fails
/// to insert for a reason other than already existing.
pub async fn menu(store: &Store, out: Output, file: Option<&Path>) -> CommandResult {
    let menu = match file {
        Some(path) => {
            info!(path = %path.display(), "Loading menu from file");
            Menu::load(path).await?
        }
        None => {
            info!("Loading demo menu");
            Menu::demo()?
        }
    };

    if menu.is_empty() {
        warn!("Menu has no records");
    }

    info!(
        records = menu.len(),
        allergens = menu.allergens.len(),
        ingredients = menu.ingredients.len(),
        flavors = menu.flavors.len(),
        "Parsed menu"
    );

    let report = seed::seed(store.pool(), &menu).await?;

    out.done(
        &format!(
            "Seeded {} records ({} already existed)",
            report.inserted, report.skipped
        ),
        &json!({ "inserted": report.inserted, "skipped": report.skipped }),
    )?;
    Ok(())
}
