//! Rendering command results to stdout, as text or JSON.

#![allow(clippy::print_stdout)]

use std::fmt::Write as _;

use serde::Serialize;

use parlour_catalog::{Allergen, CartLine, Flavor, Ingredient};
use parlour_core::Price;

/// Where command results go. Logs are written separately, to stderr.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

/// JSON shape of `view-cart`.
#[derive(Serialize)]
struct CartView<'a> {
    lines: &'a [CartLine],
    total: Price,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print a confirmation message, or `value` as JSON.
    pub fn done<T: Serialize>(self, message: &str, value: &T) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{message}");
        }
        Ok(())
    }

    pub fn flavors(self, flavors: &[Flavor]) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(flavors)?);
            return Ok(());
        }

        if flavors.is_empty() {
            println!("No matching flavors.");
            return Ok(());
        }

        for flavor in flavors {
            println!("{}", flavor_line(flavor));
        }
        Ok(())
    }

    pub fn cart(self, lines: &[CartLine], total: Price) -> Result<(), serde_json::Error> {
        if self.json {
            let view = CartView { lines, total };
            println!("{}", serde_json::to_string_pretty(&view)?);
            return Ok(());
        }

        if lines.is_empty() {
            println!("Cart is empty.");
            return Ok(());
        }

        let width = lines
            .iter()
            .map(|line| line.flavor_name.as_str().chars().count())
            .max()
            .unwrap_or(0)
            .max("Flavor".len());

        println!("{:<width$}  {:>5}  {:>10}  {:>10}", "Flavor", "Qty", "Unit", "Total");
        for line in lines {
            println!(
                "{:<width$}  {:>5}  {:>10}  {:>10}",
                line.flavor_name.as_str(),
                line.quantity,
                line.unit_price.to_string(),
                line.line_total.to_string(),
            );
        }
        println!("Total: {total}");
        Ok(())
    }

    pub fn ingredients(self, ingredients: &[Ingredient]) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(ingredients)?);
            return Ok(());
        }

        if ingredients.is_empty() {
            println!("No ingredients.");
        }
        for ingredient in ingredients {
            println!(
                "{}: {} {}",
                ingredient.name, ingredient.quantity, ingredient.unit
            );
        }
        Ok(())
    }

    pub fn allergens(self, allergens: &[Allergen]) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(allergens)?);
            return Ok(());
        }

        if allergens.is_empty() {
            println!("No allergens.");
        }
        for allergen in allergens {
            println!("{}", allergen.name);
        }
        Ok(())
    }
}

fn flavor_line(flavor: &Flavor) -> String {
    let mut line = format!("{}  {}", flavor.name, flavor.price);

    if flavor.is_seasonal {
        line.push_str("  [seasonal]");
    }

    if !flavor.allergens.is_empty() {
        let names: Vec<&str> = flavor.allergens.iter().map(|a| a.as_str()).collect();
        let _ = write!(line, "  allergens: {}", names.join(", "));
    }

    if !flavor.description.is_empty() {
        let _ = write!(line, "\n    {}", flavor.description);
    }

    line
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDateTime;
    use parlour_core::{FlavorId, Name};

    use super::*;

    fn flavor(seasonal: bool, allergens: &[&str], description: &str) -> Flavor {
        let at = NaiveDateTime::default();
        Flavor {
            id: FlavorId::new(1),
            name: Name::parse("Mint Chip").unwrap(),
            description: description.to_owned(),
            is_seasonal: seasonal,
            price: Price::parse("4.50").unwrap(),
            allergens: allergens.iter().map(|a| Name::parse(a).unwrap()).collect(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_flavor_line_plain() {
        assert_eq!(flavor_line(&flavor(false, &[], "")), "Mint Chip  4.50");
    }

    #[test]
    fn test_flavor_line_full() {
        let line = flavor_line(&flavor(true, &["Milk", "Soy"], "Cool and minty"));
        assert_eq!(
            line,
            "Mint Chip  4.50  [seasonal]  allergens: Milk, Soy\n    Cool and minty"
        );
    }
}
