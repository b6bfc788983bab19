//! Ingredient inventory domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use parlour_core::{IngredientId, Name};

/// An ingredient and the amount currently in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique ingredient ID.
    pub id: IngredientId,
    /// Ingredient name, unique case-insensitively.
    pub name: Name,
    /// Amount in stock, never negative.
    pub quantity: i64,
    /// Unit the quantity is counted in (e.g. "grams").
    pub unit: String,
    /// When the ingredient was added.
    pub created_at: NaiveDateTime,
    /// When the stock level last changed.
    pub updated_at: NaiveDateTime,
}

/// Input for adding an ingredient.
#[derive(Debug, Clone, Deserialize)]
pub struct NewIngredient {
    /// Ingredient name.
    pub name: Name,
    /// Initial amount in stock.
    pub quantity: i64,
    /// Unit the quantity is counted in.
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl NewIngredient {
    /// Unit used when none is given.
    pub const DEFAULT_UNIT: &'static str = "grams";

    /// Create an ingredient input counted in [`NewIngredient::DEFAULT_UNIT`].
    #[must_use]
    pub fn new(name: Name, quantity: i64) -> Self {
        Self {
            name,
            quantity,
            unit: default_unit(),
        }
    }

    /// Set the unit the quantity is counted in.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

fn default_unit() -> String {
    NewIngredient::DEFAULT_UNIT.to_owned()
}
