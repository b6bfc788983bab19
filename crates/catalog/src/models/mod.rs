//! Domain models for the catalog and cart.

pub mod allergen;
pub mod cart;
pub mod flavor;
pub mod ingredient;

pub use allergen::Allergen;
pub use cart::{CartItem, CartLine};
pub use flavor::{Flavor, FlavorFilter, FlavorUpdate, NewFlavor};
pub use ingredient::{Ingredient, NewIngredient};
