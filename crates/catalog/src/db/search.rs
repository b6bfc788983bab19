//! Flavor search and filtering.
//!
//! Read-only. Substring matching and name ordering fold ASCII case only,
//! matching `SQLite`'s `NOCASE` collation.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::RepositoryError;
use super::catalog::{FlavorRow, hydrate_flavors};
use crate::models::{Flavor, FlavorFilter};

/// Allergen membership test against the flavor aliased `f`.
const HAS_ALLERGEN: &str = r"
    EXISTS (
        SELECT 1
        FROM flavor_allergens fa
        JOIN allergens a ON a.id = fa.allergen_id
        WHERE fa.flavor_id = f.id AND a.name = ";

/// Searches flavors by attribute.
pub struct FlavorSearch<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FlavorSearch<'a> {
    /// Create a new flavor search.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Return every flavor matching `filter`, ordered by name.
    ///
    /// An allergen named in the filter that does not exist is not an error:
    /// no flavor contains it and every flavor is free of it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, filter: &FlavorFilter) -> Result<Vec<Flavor>, RepositoryError> {
        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            r"
            SELECT f.id, f.name, f.description, f.is_seasonal, f.price_cents,
                   f.created_at, f.updated_at
            FROM flavors f
            WHERE 1 = 1",
        );

        if let Some(seasonal) = filter.seasonal {
            query.push(" AND f.is_seasonal = ").push_bind(seasonal);
        }

        if let Some(needle) = &filter.name_contains {
            query
                .push(" AND instr(lower(f.name), lower(")
                .push_bind(needle.clone())
                .push(")) > 0");
        }

        if let Some(keyword) = &filter.keyword {
            query
                .push(" AND (instr(lower(f.name), lower(")
                .push_bind(keyword.clone())
                .push(")) > 0 OR instr(lower(f.description), lower(")
                .push_bind(keyword.clone())
                .push(")) > 0)");
        }

        if let Some(allergen) = &filter.containing_allergen {
            query
                .push(" AND")
                .push(HAS_ALLERGEN)
                .push_bind(allergen.as_str().to_owned())
                .push(")");
        }

        if let Some(allergen) = &filter.free_of_allergen {
            query
                .push(" AND NOT")
                .push(HAS_ALLERGEN)
                .push_bind(allergen.as_str().to_owned())
                .push(")");
        }

        query.push(" ORDER BY f.name, f.id");

        let mut conn = self.pool.acquire().await?;
        let rows: Vec<FlavorRow> = query.build_query_as().fetch_all(&mut *conn).await?;

        tracing::debug!(?filter, matches = rows.len(), "Flavor search");

        hydrate_flavors(&mut conn, rows).await
    }
}
