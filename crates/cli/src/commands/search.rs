//! Flavor search command.

use parlour_catalog::{FlavorFilter, FlavorSearch, Store};

use super::CommandResult;
use crate::output::Output;

/// Print every flavor matching `filter`, by name.
pub async fn flavors(store: &Store, out: Output, filter: &FlavorFilter) -> CommandResult {
    let flavors = FlavorSearch::new(store.pool()).search(filter).await?;

    tracing::debug!(matches = flavors.len(), "Search complete");

    out.flavors(&flavors)?;
    Ok(())
}
