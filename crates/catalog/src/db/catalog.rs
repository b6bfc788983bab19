//! Database operations for flavors, ingredients and allergens.
//!
//! Every mutation runs in its own transaction. Name uniqueness is checked
//! before inserting so callers get a clear [`RepositoryError::DuplicateName`];
//! the unique indexes back the check up.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use parlour_core::{AllergenId, FlavorId, IngredientId, Name, Price};

use super::cart::ensure_priceable;
use super::{EntityKind, RepositoryError, stored_name};
use crate::models::{Allergen, Flavor, FlavorUpdate, Ingredient, NewFlavor, NewIngredient};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for flavor queries.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FlavorRow {
    id: i64,
    name: String,
    description: String,
    is_seasonal: bool,
    price_cents: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl FlavorRow {
    pub(crate) const fn id(&self) -> FlavorId {
        FlavorId::new(self.id)
    }

    fn into_flavor(self, allergens: Vec<Name>) -> Result<Flavor, RepositoryError> {
        let price = Price::from_cents(self.price_cents).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for flavor {}: {e}", self.id))
        })?;

        Ok(Flavor {
            id: FlavorId::new(self.id),
            name: stored_name(&self.name)?,
            description: self.description,
            is_seasonal: self.is_seasonal,
            price,
            allergens,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Internal row type for ingredient queries.
#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: i64,
    name: String,
    quantity: i64,
    unit: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = RepositoryError;

    fn try_from(row: IngredientRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: IngredientId::new(row.id),
            name: stored_name(&row.name)?,
            quantity: row.quantity,
            unit: row.unit,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for allergen queries.
#[derive(Debug, sqlx::FromRow)]
struct AllergenRow {
    id: i64,
    name: String,
    created_at: NaiveDateTime,
}

impl TryFrom<AllergenRow> for Allergen {
    type Error = RepositoryError;

    fn try_from(row: AllergenRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AllergenId::new(row.id),
            name: stored_name(&row.name)?,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Shared Lookups
// =============================================================================

pub(crate) async fn flavor_id_by_name(
    conn: &mut SqliteConnection,
    name: &Name,
) -> Result<Option<FlavorId>, RepositoryError> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM flavors WHERE name = ?")
        .bind(name.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    Ok(id.map(FlavorId::new))
}

async fn allergen_id_by_name(
    conn: &mut SqliteConnection,
    name: &Name,
) -> Result<Option<AllergenId>, RepositoryError> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM allergens WHERE name = ?")
        .bind(name.as_str())
        .fetch_optional(&mut *conn)
        .await?;

    Ok(id.map(AllergenId::new))
}

async fn ingredient_by_name(
    conn: &mut SqliteConnection,
    name: &Name,
) -> Result<Option<Ingredient>, RepositoryError> {
    let row = sqlx::query_as::<_, IngredientRow>(
        r"
        SELECT id, name, quantity, unit, created_at, updated_at
        FROM ingredients
        WHERE name = ?
        ",
    )
    .bind(name.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(Ingredient::try_from).transpose()
}

/// Load allergen names for each of `ids`, sorted by name.
async fn allergens_for(
    conn: &mut SqliteConnection,
    ids: &[FlavorId],
) -> Result<HashMap<FlavorId, Vec<Name>>, RepositoryError> {
    let mut tags: HashMap<FlavorId, Vec<Name>> = HashMap::new();
    if ids.is_empty() {
        return Ok(tags);
    }

    let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
        r"
        SELECT fa.flavor_id, a.name
        FROM flavor_allergens fa
        JOIN allergens a ON a.id = fa.allergen_id
        WHERE fa.flavor_id IN (",
    );
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id.as_i64());
    }
    separated.push_unseparated(") ORDER BY a.name, a.id");

    let rows: Vec<(i64, String)> = query.build_query_as().fetch_all(&mut *conn).await?;

    for (flavor_id, name) in rows {
        tags.entry(FlavorId::new(flavor_id))
            .or_default()
            .push(stored_name(&name)?);
    }

    Ok(tags)
}

/// Attach allergen tags to flavor rows, preserving row order.
pub(crate) async fn hydrate_flavors(
    conn: &mut SqliteConnection,
    rows: Vec<FlavorRow>,
) -> Result<Vec<Flavor>, RepositoryError> {
    let ids: Vec<FlavorId> = rows.iter().map(FlavorRow::id).collect();
    let mut tags = allergens_for(conn, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let allergens = tags.remove(&row.id()).unwrap_or_default();
            row.into_flavor(allergens)
        })
        .collect()
}

async fn flavor_by_id(
    conn: &mut SqliteConnection,
    id: FlavorId,
) -> Result<Option<Flavor>, RepositoryError> {
    let row = sqlx::query_as::<_, FlavorRow>(
        r"
        SELECT id, name, description, is_seasonal, price_cents, created_at, updated_at
        FROM flavors
        WHERE id = ?
        ",
    )
    .bind(id.as_i64())
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => Ok(hydrate_flavors(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for flavor, ingredient and allergen operations.
pub struct CatalogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Flavors
    // =========================================================================

    /// Add a flavor, tagging it with the named allergens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateName` if a flavor with this name exists.
    /// Returns `RepositoryError::NotFound` if a named allergen does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_flavor(&self, input: &NewFlavor) -> Result<FlavorId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if flavor_id_by_name(&mut tx, &input.name).await?.is_some() {
            return Err(RepositoryError::duplicate(EntityKind::Flavor, &input.name));
        }

        let mut allergen_ids = Vec::with_capacity(input.allergens.len());
        for allergen in &input.allergens {
            let id = allergen_id_by_name(&mut tx, allergen)
                .await?
                .ok_or_else(|| RepositoryError::not_found(EntityKind::Allergen, allergen))?;
            allergen_ids.push(id);
        }

        let id = sqlx::query(
            r"
            INSERT INTO flavors (name, description, is_seasonal, price_cents)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(input.name.as_str())
        .bind(input.description.trim())
        .bind(input.is_seasonal)
        .bind(input.price.cents())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, EntityKind::Flavor, &input.name))?
        .last_insert_rowid();

        for allergen_id in allergen_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO flavor_allergens (flavor_id, allergen_id) VALUES (?, ?)",
            )
            .bind(id)
            .bind(allergen_id.as_i64())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            flavor = %input.name,
            id,
            price = %input.price,
            seasonal = input.is_seasonal,
            "Flavor added"
        );

        Ok(FlavorId::new(id))
    }

    /// Get a flavor by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_flavor(&self, name: &Name) -> Result<Option<Flavor>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        match flavor_id_by_name(&mut conn, name).await? {
            Some(id) => flavor_by_id(&mut conn, id).await,
            None => Ok(None),
        }
    }

    /// Edit a flavor's price, seasonal flag or description.
    ///
    /// Cart lines pick up a new price immediately since they are priced on read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the flavor does not exist.
    /// Returns `RepositoryError::InvalidValue` if the new price would make the
    /// cart total overflow.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_flavor(
        &self,
        name: &Name,
        update: &FlavorUpdate,
    ) -> Result<Flavor, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = flavor_id_by_name(&mut tx, name)
            .await?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Flavor, name))?;

        if let Some(price) = update.price {
            let in_cart: Option<i64> =
                sqlx::query_scalar("SELECT quantity FROM cart WHERE flavor_id = ?")
                    .bind(id.as_i64())
                    .fetch_optional(&mut *tx)
                    .await?;
            if let Some(quantity) = in_cart {
                ensure_priceable(&mut tx, id, price, quantity).await?;
            }
        }

        if !update.is_empty() {
            let mut query: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new("UPDATE flavors SET updated_at = CURRENT_TIMESTAMP");
            if let Some(price) = update.price {
                query.push(", price_cents = ").push_bind(price.cents());
            }
            if let Some(is_seasonal) = update.is_seasonal {
                query.push(", is_seasonal = ").push_bind(is_seasonal);
            }
            if let Some(description) = &update.description {
                query
                    .push(", description = ")
                    .push_bind(description.trim().to_owned());
            }
            query.push(" WHERE id = ").push_bind(id.as_i64());
            query.build().execute(&mut *tx).await?;
        }

        let flavor = flavor_by_id(&mut tx, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Flavor, name))?;

        tx.commit().await?;

        tracing::info!(flavor = %name, price = %flavor.price, "Flavor updated");

        Ok(flavor)
    }

    /// Remove a flavor, its allergen tags and its cart entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the flavor does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_flavor(&self, name: &Name) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = flavor_id_by_name(&mut tx, name)
            .await?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Flavor, name))?;

        let cart_entries = sqlx::query("DELETE FROM cart WHERE flavor_id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM flavor_allergens WHERE flavor_id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM flavors WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(flavor = %name, cart_entries, "Flavor removed");

        Ok(())
    }

    /// Tag a flavor with an allergen.
    ///
    /// Returns `false` if the flavor was already tagged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the flavor or allergen does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tag_allergen(
        &self,
        flavor: &Name,
        allergen: &Name,
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let (flavor_id, allergen_id) = resolve_tag(&mut tx, flavor, allergen).await?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO flavor_allergens (flavor_id, allergen_id) VALUES (?, ?)",
        )
        .bind(flavor_id.as_i64())
        .bind(allergen_id.as_i64())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        tracing::info!(%flavor, %allergen, new = inserted > 0, "Allergen tagged");

        Ok(inserted > 0)
    }

    /// Remove an allergen tag from a flavor.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the flavor, the allergen or the
    /// tag does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn untag_allergen(
        &self,
        flavor: &Name,
        allergen: &Name,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let (flavor_id, allergen_id) = resolve_tag(&mut tx, flavor, allergen).await?;

        let removed =
            sqlx::query("DELETE FROM flavor_allergens WHERE flavor_id = ? AND allergen_id = ?")
                .bind(flavor_id.as_i64())
                .bind(allergen_id.as_i64())
                .execute(&mut *tx)
                .await?
                .rows_affected();

        if removed == 0 {
            return Err(RepositoryError::not_found(
                EntityKind::AllergenTag,
                format!("{allergen} on {flavor}"),
            ));
        }

        tx.commit().await?;

        tracing::info!(%flavor, %allergen, "Allergen untagged");

        Ok(())
    }

    // =========================================================================
    // Ingredients
    // =========================================================================

    /// Add an ingredient with an initial stock level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidValue` if the quantity is negative or the unit is blank.
    /// Returns `RepositoryError::DuplicateName` if an ingredient with this name exists.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_ingredient(
        &self,
        input: &NewIngredient,
    ) -> Result<IngredientId, RepositoryError> {
        if input.quantity < 0 {
            return Err(RepositoryError::InvalidValue(format!(
                "ingredient quantity cannot be negative (got {})",
                input.quantity
            )));
        }

        let unit = input.unit.trim();
        if unit.is_empty() {
            return Err(RepositoryError::InvalidValue(
                "ingredient unit cannot be empty".to_owned(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        if ingredient_by_name(&mut tx, &input.name).await?.is_some() {
            return Err(RepositoryError::duplicate(EntityKind::Ingredient, &input.name));
        }

        let id = sqlx::query("INSERT INTO ingredients (name, quantity, unit) VALUES (?, ?, ?)")
            .bind(input.name.as_str())
            .bind(input.quantity)
            .bind(unit)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_insert(e, EntityKind::Ingredient, &input.name))?
            .last_insert_rowid();

        tx.commit().await?;

        tracing::info!(
            ingredient = %input.name,
            id,
            quantity = input.quantity,
            unit,
            "Ingredient added"
        );

        Ok(IngredientId::new(id))
    }

    /// Restock (positive `delta`) or consume (negative `delta`) an ingredient.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ingredient does not exist.
    /// Returns `RepositoryError::InvalidValue` if the stock would go below zero.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_ingredient_quantity(
        &self,
        name: &Name,
        delta: i64,
    ) -> Result<Ingredient, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let ingredient = ingredient_by_name(&mut tx, name)
            .await?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Ingredient, name))?;

        let quantity = ingredient
            .quantity
            .checked_add(delta)
            .filter(|quantity| *quantity >= 0)
            .ok_or_else(|| {
                RepositoryError::InvalidValue(format!(
                    "cannot change {name} by {delta}: only {} {} in stock",
                    ingredient.quantity, ingredient.unit
                ))
            })?;

        sqlx::query(
            "UPDATE ingredients SET quantity = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(quantity)
        .bind(ingredient.id.as_i64())
        .execute(&mut *tx)
        .await?;

        let updated = ingredient_by_name(&mut tx, name)
            .await?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Ingredient, name))?;

        tx.commit().await?;

        tracing::info!(
            ingredient = %name,
            delta,
            quantity = updated.quantity,
            "Ingredient stock updated"
        );

        Ok(updated)
    }

    /// Get an ingredient by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_ingredient(
        &self,
        name: &Name,
    ) -> Result<Option<Ingredient>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        ingredient_by_name(&mut conn, name).await
    }

    /// List all ingredients by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_ingredients(&self) -> Result<Vec<Ingredient>, RepositoryError> {
        let rows = sqlx::query_as::<_, IngredientRow>(
            r"
            SELECT id, name, quantity, unit, created_at, updated_at
            FROM ingredients
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Ingredient::try_from).collect()
    }

    /// Remove an ingredient.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ingredient does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_ingredient(&self, name: &Name) -> Result<(), RepositoryError> {
        let removed = sqlx::query("DELETE FROM ingredients WHERE name = ?")
            .bind(name.as_str())
            .execute(self.pool)
            .await?
            .rows_affected();

        if removed == 0 {
            return Err(RepositoryError::not_found(EntityKind::Ingredient, name));
        }

        tracing::info!(ingredient = %name, "Ingredient removed");

        Ok(())
    }

    // =========================================================================
    // Allergens
    // =========================================================================

    /// Add an allergen.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateName` if an allergen with this name exists.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_allergen(&self, name: &Name) -> Result<AllergenId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if allergen_id_by_name(&mut tx, name).await?.is_some() {
            return Err(RepositoryError::duplicate(EntityKind::Allergen, name));
        }

        let id = sqlx::query("INSERT INTO allergens (name) VALUES (?)")
            .bind(name.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_insert(e, EntityKind::Allergen, name))?
            .last_insert_rowid();

        tx.commit().await?;

        tracing::info!(allergen = %name, id, "Allergen added");

        Ok(AllergenId::new(id))
    }

    /// List all allergens by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_allergens(&self) -> Result<Vec<Allergen>, RepositoryError> {
        let rows = sqlx::query_as::<_, AllergenRow>(
            "SELECT id, name, created_at FROM allergens ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Allergen::try_from).collect()
    }

    /// Remove an allergen and untag every flavor carrying it.
    ///
    /// Returns the number of flavors that were untagged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the allergen does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_allergen(&self, name: &Name) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = allergen_id_by_name(&mut tx, name)
            .await?
            .ok_or_else(|| RepositoryError::not_found(EntityKind::Allergen, name))?;

        let untagged = sqlx::query("DELETE FROM flavor_allergens WHERE allergen_id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM allergens WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(allergen = %name, untagged, "Allergen removed");

        Ok(untagged)
    }
}

async fn resolve_tag(
    conn: &mut SqliteConnection,
    flavor: &Name,
    allergen: &Name,
) -> Result<(FlavorId, AllergenId), RepositoryError> {
    let flavor_id = flavor_id_by_name(conn, flavor)
        .await?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Flavor, flavor))?;
    let allergen_id = allergen_id_by_name(conn, allergen)
        .await?
        .ok_or_else(|| RepositoryError::not_found(EntityKind::Allergen, allergen))?;

    Ok((flavor_id, allergen_id))
}
