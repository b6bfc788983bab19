//! Flavor, ingredient and allergen commands.

use serde_json::json;

use parlour_catalog::{CatalogRepository, FlavorUpdate, NewFlavor, NewIngredient, Store};
use parlour_core::Name;

use super::CommandResult;
use crate::output::Output;

/// Add a flavor.
pub async fn add_flavor(store: &Store, out: Output, input: &NewFlavor) -> CommandResult {
    let id = CatalogRepository::new(store.pool())
        .add_flavor(input)
        .await?;

    out.done(
        &format!("Added flavor {} at {} (id {id})", input.name, input.price),
        &json!({ "id": id }),
    )?;
    Ok(())
}

/// Add an ingredient.
pub async fn add_ingredient(store: &Store, out: Output, input: &NewIngredient) -> CommandResult {
    let id = CatalogRepository::new(store.pool())
        .add_ingredient(input)
        .await?;

    out.done(
        &format!(
            "Added ingredient {}: {} {} (id {id})",
            input.name, input.quantity, input.unit
        ),
        &json!({ "id": id }),
    )?;
    Ok(())
}

/// Add an allergen.
pub async fn add_allergen(store: &Store, out: Output, name: &Name) -> CommandResult {
    let id = CatalogRepository::new(store.pool())
        .add_allergen(name)
        .await?;

    out.done(
        &format!("Added allergen {name} (id {id})"),
        &json!({ "id": id }),
    )?;
    Ok(())
}

/// Restock or consume an ingredient.
pub async fn update_quantity(
    store: &Store,
    out: Output,
    name: &Name,
    delta: i64,
) -> CommandResult {
    let ingredient = CatalogRepository::new(store.pool())
        .update_ingredient_quantity(name, delta)
        .await?;

    out.done(
        &format!(
            "{}: {} {} in stock",
            ingredient.name, ingredient.quantity, ingredient.unit
        ),
        &ingredient,
    )?;
    Ok(())
}

/// Edit a flavor.
pub async fn update_flavor(
    store: &Store,
    out: Output,
    name: &Name,
    update: &FlavorUpdate,
) -> CommandResult {
    if update.is_empty() {
        tracing::warn!(flavor = %name, "Nothing to update");
    }

    let flavor = CatalogRepository::new(store.pool())
        .update_flavor(name, update)
        .await?;

    out.done(
        &format!(
            "Updated flavor {}: {}{}",
            flavor.name,
            flavor.price,
            if flavor.is_seasonal { " (seasonal)" } else { "" }
        ),
        &flavor,
    )?;
    Ok(())
}

/// Tag a flavor with an allergen.
pub async fn tag_allergen(
    store: &Store,
    out: Output,
    flavor: &Name,
    allergen: &Name,
) -> CommandResult {
    let added = CatalogRepository::new(store.pool())
        .tag_allergen(flavor, allergen)
        .await?;

    let message = if added {
        format!("Tagged {flavor} with {allergen}")
    } else {
        format!("{flavor} was already tagged with {allergen}")
    };
    out.done(&message, &json!({ "tagged": added }))?;
    Ok(())
}

/// Remove an allergen tag from a flavor.
pub async fn untag_allergen(
    store: &Store,
    out: Output,
    flavor: &Name,
    allergen: &Name,
) -> CommandResult {
    CatalogRepository::new(store.pool())
        .untag_allergen(flavor, allergen)
        .await?;

    out.done(
        &format!("Removed {allergen} tag from {flavor}"),
        &json!({ "untagged": true }),
    )?;
    Ok(())
}

/// List ingredient stock levels.
pub async fn list_ingredients(store: &Store, out: Output) -> CommandResult {
    let ingredients = CatalogRepository::new(store.pool())
        .list_ingredients()
        .await?;

    out.ingredients(&ingredients)?;
    Ok(())
}

/// List allergens.
pub async fn list_allergens(store: &Store, out: Output) -> CommandResult {
    let allergens = CatalogRepository::new(store.pool()).list_allergens().await?;

    out.allergens(&allergens)?;
    Ok(())
}

/// Remove a flavor.
pub async fn remove_flavor(store: &Store, out: Output, name: &Name) -> CommandResult {
    CatalogRepository::new(store.pool())
        .remove_flavor(name)
        .await?;

    out.done(&format!("Removed flavor {name}"), &json!({ "removed": true }))?;
    Ok(())
}

/// Remove an ingredient.
pub async fn remove_ingredient(store: &Store, out: Output, name: &Name) -> CommandResult {
    CatalogRepository::new(store.pool())
        .remove_ingredient(name)
        .await?;

    out.done(
        &format!("Removed ingredient {name}"),
        &json!({ "removed": true }),
    )?;
    Ok(())
}

/// Remove an allergen.
pub async fn remove_allergen(store: &Store, out: Output, name: &Name) -> CommandResult {
    let untagged = CatalogRepository::new(store.pool())
        .remove_allergen(name)
        .await?;

    out.done(
        &format!("Removed allergen {name} ({untagged} flavors untagged)"),
        &json!({ "removed": true, "flavors_untagged": untagged }),
    )?;
    Ok(())
}
