//! Cart domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use parlour_core::{CartItemId, FlavorId, Name, Price};

/// A cart entry as stored: one per flavor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Unique cart item ID.
    pub id: CartItemId,
    /// Flavor this entry is for.
    pub flavor_id: FlavorId,
    /// Number of servings, always positive.
    pub quantity: i64,
    /// When the flavor was first added to the cart.
    pub added_at: NaiveDateTime,
}

/// A priced cart line, computed from the flavor's current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// Cart entry this line was computed from.
    pub cart_item_id: CartItemId,
    /// Flavor the line is for.
    pub flavor_id: FlavorId,
    /// Flavor name.
    pub flavor_name: Name,
    /// Number of servings.
    pub quantity: i64,
    /// Current price of one serving.
    pub unit_price: Price,
    /// `unit_price * quantity`.
    pub line_total: Price,
}

impl CartLine {
    /// Sum the line totals of `lines`, returning `None` on overflow.
    #[must_use]
    pub fn total_of(lines: &[Self]) -> Option<Price> {
        Price::checked_sum(lines.iter().map(|line| line.line_total))
    }
}
