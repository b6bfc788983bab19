//! Flavor domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use parlour_core::{FlavorId, Name, Price};

/// A sellable ice cream flavor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flavor {
    /// Unique flavor ID.
    pub id: FlavorId,
    /// Flavor name, unique case-insensitively.
    pub name: Name,
    /// Free-form description shown alongside the name.
    pub description: String,
    /// Whether the flavor is only offered for part of the year.
    pub is_seasonal: bool,
    /// Price of one serving.
    pub price: Price,
    /// Names of the allergens the flavor is tagged with, sorted.
    pub allergens: Vec<Name>,
    /// When the flavor was added.
    pub created_at: NaiveDateTime,
    /// When the flavor was last edited.
    pub updated_at: NaiveDateTime,
}

/// Input for adding a flavor.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFlavor {
    /// Flavor name.
    pub name: Name,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Whether the flavor is seasonal.
    #[serde(default, alias = "seasonal")]
    pub is_seasonal: bool,
    /// Price of one serving.
    pub price: Price,
    /// Names of existing allergens to tag the flavor with.
    #[serde(default)]
    pub allergens: Vec<Name>,
}

impl NewFlavor {
    /// Create a flavor input with no description and no allergens.
    #[must_use]
    pub const fn new(name: Name, is_seasonal: bool, price: Price) -> Self {
        Self {
            name,
            description: String::new(),
            is_seasonal,
            price,
            allergens: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Tag the flavor with an existing allergen.
    #[must_use]
    pub fn with_allergen(mut self, allergen: Name) -> Self {
        self.allergens.push(allergen);
        self
    }
}

/// Edits to apply to an existing flavor. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlavorUpdate {
    /// New price.
    pub price: Option<Price>,
    /// New seasonal flag.
    pub is_seasonal: Option<bool>,
    /// New description.
    pub description: Option<String>,
}

impl FlavorUpdate {
    /// Returns `true` if no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.price.is_none() && self.is_seasonal.is_none() && self.description.is_none()
    }
}

/// Predicate for flavor searches. Every set field must match.
#[derive(Debug, Clone, Default)]
pub struct FlavorFilter {
    /// Only seasonal (`true`) or only year-round (`false`) flavors.
    pub seasonal: Option<bool>,
    /// Case-insensitive substring of the name.
    pub name_contains: Option<String>,
    /// Case-insensitive substring of the name or the description.
    pub keyword: Option<String>,
    /// Only flavors tagged with this allergen.
    pub containing_allergen: Option<Name>,
    /// Only flavors not tagged with this allergen.
    pub free_of_allergen: Option<Name>,
}

impl FlavorFilter {
    /// A filter matching every flavor.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to seasonal or year-round flavors.
    #[must_use]
    pub const fn seasonal(mut self, seasonal: bool) -> Self {
        self.seasonal = Some(seasonal);
        self
    }

    /// Restrict to names containing `needle`.
    #[must_use]
    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        self.name_contains = Some(needle.into());
        self
    }

    /// Restrict to names or descriptions containing `keyword`.
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Restrict to flavors tagged with `allergen`.
    #[must_use]
    pub fn containing_allergen(mut self, allergen: Name) -> Self {
        self.containing_allergen = Some(allergen);
        self
    }

    /// Restrict to flavors not tagged with `allergen`.
    #[must_use]
    pub fn free_of_allergen(mut self, allergen: Name) -> Self {
        self.free_of_allergen = Some(allergen);
        self
    }
}
