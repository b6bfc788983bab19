//! Parlour CLI - Ice cream cafe catalog, inventory and cart.
//!
//! # Usage
//!
//! ```bash
//! # Load the demo menu
//! parlour seed
//!
//! # Add catalog records
//! parlour add-allergen Peanuts
//! parlour add-flavor "Mint Chip" 4.50 --allergen Milk
//! parlour add-ingredient "Vanilla Beans" 100 --unit grams
//!
//! # Restock / consume
//! parlour update-quantity "Vanilla Beans" -25
//!
//! # Cart
//! parlour add-to-cart "Mint Chip" 2
//! parlour view-cart
//!
//! # Search
//! parlour search-flavors --seasonal true --without-allergen Nuts
//! ```
//!
//! # Environment Variables
//!
//! - `PARLOUR_DATABASE_PATH` - `SQLite` catalog file (default: `ice_cream_cafe.db`)
//! - `RUST_LOG` - Log filter (default: `parlour_catalog=info,parlour_cli=info`)
//!
//! Logs go to stderr; command output goes to stdout (as JSON with `--json`).
//! The process exits with status 1 if the command fails.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parlour_catalog::{CatalogConfig, FlavorFilter, FlavorUpdate, NewFlavor, NewIngredient, Store};
use parlour_core::{Name, Price};

mod commands;
mod output;

use output::Output;

#[derive(Parser)]
#[command(name = "parlour")]
#[command(author, version, about = "Ice cream cafe catalog, inventory and cart")]
struct Cli {
    /// `SQLite` catalog file (overrides `PARLOUR_DATABASE_PATH`)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Print command output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a flavor to the catalog
    AddFlavor {
        /// Flavor name
        name: Name,

        /// Price of one serving (e.g. 4.50)
        #[arg(allow_hyphen_values = true)]
        price: Price,

        /// Mark the flavor as seasonal
        #[arg(long)]
        seasonal: bool,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Existing allergen to tag the flavor with (repeatable)
        #[arg(short, long = "allergen")]
        allergens: Vec<Name>,
    },
    /// Add an ingredient with its initial stock
    AddIngredient {
        /// Ingredient name
        name: Name,

        /// Amount in stock
        #[arg(allow_negative_numbers = true)]
        quantity: i64,

        /// Unit the amount is counted in
        #[arg(short, long, default_value = NewIngredient::DEFAULT_UNIT)]
        unit: String,
    },
    /// Add an allergen
    AddAllergen {
        /// Allergen name
        name: Name,
    },
    /// Restock (positive) or consume (negative) an ingredient
    UpdateQuantity {
        /// Ingredient name
        name: Name,

        /// Change in stock
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Edit a flavor's price, seasonal flag or description
    UpdateFlavor {
        /// Flavor name
        name: Name,

        /// New price
        #[arg(long, allow_hyphen_values = true)]
        price: Option<Price>,

        /// New seasonal flag (true/false)
        #[arg(long)]
        seasonal: Option<bool>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Tag a flavor with an allergen
    TagAllergen {
        /// Flavor name
        flavor: Name,
        /// Allergen name
        allergen: Name,
    },
    /// Remove an allergen tag from a flavor
    UntagAllergen {
        /// Flavor name
        flavor: Name,
        /// Allergen name
        allergen: Name,
    },
    /// Add servings of a flavor to the cart
    AddToCart {
        /// Flavor name
        flavor: Name,

        /// Number of servings
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove servings of a flavor from the cart
    RemoveFromCart {
        /// Flavor name
        flavor: Name,

        /// Number of servings
        #[arg(default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Show the cart priced at current flavor prices
    ViewCart,
    /// Empty the cart
    ClearCart,
    /// Search and filter flavors
    SearchFlavors {
        /// Only seasonal (true) or year-round (false) flavors
        #[arg(long)]
        seasonal: Option<bool>,

        /// Name contains (case-insensitive)
        #[arg(long)]
        name: Option<String>,

        /// Name or description contains (case-insensitive)
        #[arg(short, long)]
        keyword: Option<String>,

        /// Only flavors tagged with this allergen
        #[arg(long)]
        with_allergen: Option<Name>,

        /// Only flavors not tagged with this allergen
        #[arg(long)]
        without_allergen: Option<Name>,
    },
    /// List ingredient stock levels
    ListIngredients,
    /// List allergens
    ListAllergens,
    /// Remove a flavor (and its cart entry)
    RemoveFlavor {
        /// Flavor name
        name: Name,
    },
    /// Remove an ingredient
    RemoveIngredient {
        /// Ingredient name
        name: Name,
    },
    /// Remove an allergen (and untag every flavor carrying it)
    RemoveAllergen {
        /// Allergen name
        name: Name,
    },
    /// Seed the catalog from a YAML menu (the demo menu by default)
    Seed {
        /// Menu file to load
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing on stderr. Defaults to info for our crates if
/// `RUST_LOG` is not set.
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "parlour_catalog=info,parlour_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CatalogConfig::from_env()?;
    if let Some(path) = cli.database {
        config = config.with_database_path(path);
    }

    let store = Store::from_config(&config).await?;
    tracing::debug!(path = %config.database_path.display(), "Using catalog");

    let result = dispatch(cli.command, &store, Output::new(cli.json)).await;

    store.close().await;
    result
}

async fn dispatch(
    command: Commands,
    store: &Store,
    out: Output,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::AddFlavor {
            name,
            price,
            seasonal,
            description,
            allergens,
        } => {
            let input = NewFlavor {
                name,
                description,
                is_seasonal: seasonal,
                price,
                allergens,
            };
            commands::catalog::add_flavor(store, out, &input).await?;
        }
        Commands::AddIngredient {
            name,
            quantity,
            unit,
        } => {
            let input = NewIngredient::new(name, quantity).with_unit(unit);
            commands::catalog::add_ingredient(store, out, &input).await?;
        }
        Commands::AddAllergen { name } => {
            commands::catalog::add_allergen(store, out, &name).await?;
        }
        Commands::UpdateQuantity { name, delta } => {
            commands::catalog::update_quantity(store, out, &name, delta).await?;
        }
        Commands::UpdateFlavor {
            name,
            price,
            seasonal,
            description,
        } => {
            let update = FlavorUpdate {
                price,
                is_seasonal: seasonal,
                description,
            };
            commands::catalog::update_flavor(store, out, &name, &update).await?;
        }
        Commands::TagAllergen { flavor, allergen } => {
            commands::catalog::tag_allergen(store, out, &flavor, &allergen).await?;
        }
        Commands::UntagAllergen { flavor, allergen } => {
            commands::catalog::untag_allergen(store, out, &flavor, &allergen).await?;
        }
        Commands::AddToCart { flavor, quantity } => {
            commands::cart::add(store, out, &flavor, quantity).await?;
        }
        Commands::RemoveFromCart { flavor, quantity } => {
            commands::cart::remove(store, out, &flavor, quantity).await?;
        }
        Commands::ViewCart => commands::cart::view(store, out).await?,
        Commands::ClearCart => commands::cart::clear(store, out).await?,
        Commands::SearchFlavors {
            seasonal,
            name,
            keyword,
            with_allergen,
            without_allergen,
        } => {
            let filter = FlavorFilter {
                seasonal,
                name_contains: name,
                keyword,
                containing_allergen: with_allergen,
                free_of_allergen: without_allergen,
            };
            commands::search::flavors(store, out, &filter).await?;
        }
        Commands::ListIngredients => commands::catalog::list_ingredients(store, out).await?,
        Commands::ListAllergens => commands::catalog::list_allergens(store, out).await?,
        Commands::RemoveFlavor { name } => {
            commands::catalog::remove_flavor(store, out, &name).await?;
        }
        Commands::RemoveIngredient { name } => {
            commands::catalog::remove_ingredient(store, out, &name).await?;
        }
        Commands::RemoveAllergen { name } => {
            commands::catalog::remove_allergen(store, out, &name).await?;
        }
        Commands::Seed { file } => commands::seed::menu(store, out, file.as_deref()).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_flavor() {
        let cli = Cli::try_parse_from([
            "parlour",
            "add-flavor",
            "Mint Chip",
            "4.50",
            "--allergen",
            "Milk",
            "-a",
            "Soy",
        ]);
        let Ok(Cli {
            command:
                Commands::AddFlavor {
                    name,
                    price,
                    seasonal,
                    allergens,
                    ..
                },
            ..
        }) = cli
        else {
            panic!("expected add-flavor");
        };
        assert_eq!(name.as_str(), "Mint Chip");
        assert_eq!(price.cents(), 450);
        assert!(!seasonal);
        assert_eq!(allergens.len(), 2);
    }

    #[test]
    fn test_negative_price_rejected() {
        assert!(Cli::try_parse_from(["parlour", "add-flavor", "Mint Chip", "-1"]).is_err());
    }

    #[test]
    fn test_negative_delta_accepted() {
        let cli = Cli::try_parse_from(["parlour", "update-quantity", "Vanilla Beans", "-25"]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::UpdateQuantity { delta: -25, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_add_to_cart_defaults_to_one() {
        let cli = Cli::try_parse_from(["parlour", "add-to-cart", "Mint Chip"]);
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::AddToCart { quantity: 1, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["parlour", "view-cart", "--json", "--database", "x.db"]);
        assert!(matches!(
            cli,
            Ok(Cli { json: true, database: Some(_), .. })
        ));
    }
}
