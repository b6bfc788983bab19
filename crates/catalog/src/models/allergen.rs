//! Allergen domain model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use parlour_core::{AllergenId, Name};

/// A named allergen that flavors can be tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allergen {
    /// Unique allergen ID.
    pub id: AllergenId,
    /// Allergen name, unique case-insensitively.
    pub name: Name,
    /// When the allergen was added.
    pub created_at: NaiveDateTime,
}
