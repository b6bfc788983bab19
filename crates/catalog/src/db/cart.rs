//! Database operations for the cart.
//!
//! The cart stores quantities only. Prices are joined in from `flavors` on
//! every read, so a price change shows up in the cart straight away.

use chrono::NaiveDateTime;
use sqlx::{SqliteConnection, SqlitePool};

use parlour_core::{CartItemId, FlavorId, Name, Price};

use super::catalog::flavor_id_by_name;
use super::{EntityKind, RepositoryError, stored_name};
use crate::models::{CartItem, CartLine};

/// Internal row type for cart entries.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i64,
    flavor_id: i64,
    quantity: i64,
    added_at: NaiveDateTime,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            flavor_id: FlavorId::new(row.flavor_id),
            quantity: row.quantity,
            added_at: row.added_at,
        }
    }
}

/// Internal row type for priced cart lines.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i64,
    flavor_id: i64,
    flavor_name: String,
    price_cents: i64,
    quantity: i64,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let unit_price = Price::from_cents(row.price_cents).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid price for flavor {}: {e}",
                row.flavor_id
            ))
        })?;
        let line_total = unit_price.checked_mul(row.quantity).ok_or_else(|| {
            RepositoryError::InvalidValue(format!(
                "line total for {} overflows ({} x {unit_price})",
                row.flavor_name, row.quantity
            ))
        })?;

        Ok(Self {
            cart_item_id: CartItemId::new(row.id),
            flavor_id: FlavorId::new(row.flavor_id),
            flavor_name: stored_name(&row.flavor_name)?,
            quantity: row.quantity,
            unit_price,
            line_total,
        })
    }
}

async fn cart_item_for(
    conn: &mut SqliteConnection,
    flavor_id: FlavorId,
) -> Result<Option<CartItem>, RepositoryError> {
    let row = sqlx::query_as::<_, CartItemRow>(
        "SELECT id, flavor_id, quantity, added_at FROM cart WHERE flavor_id = ?",
    )
    .bind(flavor_id.as_i64())
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(CartItem::from))
}

/// Fail with `InvalidValue` unless the whole cart can still be priced once
/// `flavor_id` is charged `unit_price` for `quantity` servings.
///
/// Every other entry is priced as stored. Call this inside the transaction
/// that changes the quantity or price, before the change is written.
pub(crate) async fn ensure_priceable(
    conn: &mut SqliteConnection,
    flavor_id: FlavorId,
    unit_price: Price,
    quantity: i64,
) -> Result<(), RepositoryError> {
    let others: Vec<(i64, i64)> = sqlx::query_as(
        r"
        SELECT f.price_cents, c.quantity
        FROM cart c
        JOIN flavors f ON f.id = c.flavor_id
        WHERE c.flavor_id != ?
        ",
    )
    .bind(flavor_id.as_i64())
    .fetch_all(&mut *conn)
    .await?;

    let mut total = unit_price.checked_mul(quantity);
    for (price_cents, servings) in others {
        let line = Price::from_cents(price_cents)?.checked_mul(servings);
        total = total.zip(line).and_then(|(total, line)| total.checked_add(line));
    }

    if total.is_none() {
        return Err(RepositoryError::InvalidValue(format!(
            "{quantity} x {unit_price} would overflow the cart total"
        )));
    }
    Ok(())
}

fn require_positive(quantity: i64) -> Result<(), RepositoryError> {
    if quantity <= 0 {
        return Err(RepositoryError::InvalidValue(format!(
            "cart quantity must be positive (got {quantity})"
        )));
    }
    Ok(())
}

/// Repository for cart operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add servings of a flavor, merging with an existing entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidValue` if `quantity` is not positive or
    /// the cart could no longer be totalled.
    /// Returns `RepositoryError::NotFound` if the flavor does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_to_cart(
        &self,
        flavor: &Name,
        quantity: i64,
    ) -> Result<CartItem, RepositoryError> {
        require_positive(quantity)?;

        let mut tx = self.pool.begin().await?;

        let flavor_id = flavor_id_by_name(&mut tx, flavor)
            .await?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Flavor, flavor))?;
        let price_cents: i64 = sqlx::query_scalar("SELECT price_cents FROM flavors WHERE id = ?")
            .bind(flavor_id.as_i64())
            .fetch_one(&mut *tx)
            .await?;
        let unit_price = Price::from_cents(price_cents)?;

        match cart_item_for(&mut tx, flavor_id).await? {
            Some(existing) => {
                let merged = existing.quantity.checked_add(quantity).ok_or_else(|| {
                    RepositoryError::InvalidValue(format!(
                        "cart quantity for {flavor} overflows"
                    ))
                })?;
                ensure_priceable(&mut tx, flavor_id, unit_price, merged).await?;

                sqlx::query("UPDATE cart SET quantity = ? WHERE id = ?")
                    .bind(merged)
                    .bind(existing.id.as_i64())
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                ensure_priceable(&mut tx, flavor_id, unit_price, quantity).await?;

                sqlx::query("INSERT INTO cart (flavor_id, quantity) VALUES (?, ?)")
                    .bind(flavor_id.as_i64())
                    .bind(quantity)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        let item = cart_item_for(&mut tx, flavor_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::CartItem, flavor))?;

        tx.commit().await?;

        tracing::info!(%flavor, added = quantity, quantity = item.quantity, "Added to cart");

        Ok(item)
    }

    /// Remove servings of a flavor from the cart.
    ///
    /// The entry is deleted once its quantity would reach zero or below.
    /// Returns the remaining entry, or `None` if it was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidValue` if `quantity` is not positive.
    /// Returns `RepositoryError::NotFound` if the flavor is not in the cart.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_from_cart(
        &self,
        flavor: &Name,
        quantity: i64,
    ) -> Result<Option<CartItem>, RepositoryError> {
        require_positive(quantity)?;

        let mut tx = self.pool.begin().await?;

        let not_in_cart = || RepositoryError::not_found(EntityKind::CartItem, flavor);

        let flavor_id = flavor_id_by_name(&mut tx, flavor)
            .await?
            .ok_or_else(not_in_cart)?;
        let existing = cart_item_for(&mut tx, flavor_id)
            .await?
            .ok_or_else(not_in_cart)?;

        let remaining = existing.quantity - quantity;
        let item = if remaining <= 0 {
            sqlx::query("DELETE FROM cart WHERE id = ?")
                .bind(existing.id.as_i64())
                .execute(&mut *tx)
                .await?;
            None
        } else {
            sqlx::query("UPDATE cart SET quantity = ? WHERE id = ?")
                .bind(remaining)
                .bind(existing.id.as_i64())
                .execute(&mut *tx)
                .await?;
            Some(CartItem {
                quantity: remaining,
                ..existing
            })
        };

        tx.commit().await?;

        tracing::info!(
            %flavor,
            removed = quantity,
            remaining = remaining.max(0),
            "Removed from cart"
        );

        Ok(item)
    }

    /// Price every cart entry at current flavor prices, in the order the
    /// flavors were first added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidValue` if a line total overflows.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn view_cart(&self) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT c.id, c.flavor_id, f.name AS flavor_name, f.price_cents, c.quantity
            FROM cart c
            JOIN flavors f ON f.id = c.flavor_id
            ORDER BY c.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        tracing::debug!(lines = rows.len(), "Cart loaded");

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// Sum of all cart line totals; zero for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidValue` if the total overflows.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart_total(&self) -> Result<Price, RepositoryError> {
        let lines = self.view_cart().await?;

        CartLine::total_of(&lines)
            .ok_or_else(|| RepositoryError::InvalidValue("cart total overflows".to_owned()))
    }

    /// Empty the cart, returning the number of entries removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_cart(&self) -> Result<u64, RepositoryError> {
        let removed = sqlx::query("DELETE FROM cart")
            .execute(self.pool)
            .await?
            .rows_affected();

        tracing::info!(removed, "Cart cleared");

        Ok(removed)
    }
}
