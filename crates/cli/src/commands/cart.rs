//! Cart commands.

use serde_json::json;

use parlour_catalog::{CartLine, CartRepository, RepositoryError, Store};
use parlour_core::Name;

use super::CommandResult;
use crate::output::Output;

/// Add servings of a flavor to the cart.
pub async fn add(store: &Store, out: Output, flavor: &Name, quantity: i64) -> CommandResult {
    let item = CartRepository::new(store.pool())
        .add_to_cart(flavor, quantity)
        .await?;

    out.done(
        &format!("{flavor}: {} in cart", item.quantity),
        &item,
    )?;
    Ok(())
}

/// Remove servings of a flavor from the cart.
pub async fn remove(store: &Store, out: Output, flavor: &Name, quantity: i64) -> CommandResult {
    let remaining = CartRepository::new(store.pool())
        .remove_from_cart(flavor, quantity)
        .await?;

    let message = match &remaining {
        Some(item) => format!("{flavor}: {} in cart", item.quantity),
        None => format!("{flavor}: removed from cart"),
    };
    out.done(&message, &remaining)?;
    Ok(())
}

/// Show the cart with line totals and the cart total.
pub async fn view(store: &Store, out: Output) -> CommandResult {
    let lines = CartRepository::new(store.pool()).view_cart().await?;
    let total = CartLine::total_of(&lines)
        .ok_or_else(|| RepositoryError::InvalidValue("cart total overflows".to_owned()))?;

    out.cart(&lines, total)?;
    Ok(())
}

/// Empty the cart.
pub async fn clear(store: &Store, out: Output) -> CommandResult {
    let removed = CartRepository::new(store.pool()).clear_cart().await?;

    out.done(
        &format!("Cart cleared ({removed} entries removed)"),
        &json!({ "removed": removed }),
    )?;
    Ok(())
}
