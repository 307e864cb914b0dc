//! # Category Repository

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use tally_core::validation::validate_name;
use tally_core::Category;

/// Repository for product categories. Names are unique.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Name already taken
    pub async fn insert(&self, name: &str, description: Option<&str>) -> DbResult<Category> {
        validate_name("category name", name)?;

        let category = Category {
            id: generate_id(),
            name: name.trim().to_string(),
            description: description.map(str::to_string),
        };

        debug!(name = %category.name, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name, description) VALUES (?1, ?2, ?3)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.description)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_key("category", &category.name))?;

        Ok(category)
    }

    /// All categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE name = ?1",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Finds a category by name, creating it if absent (CSV import).
    pub async fn get_or_create(&self, name: &str) -> DbResult<Category> {
        if let Some(existing) = self.get_by_name(name).await? {
            return Ok(existing);
        }
        self.insert(name, None).await
    }
}
