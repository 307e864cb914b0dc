//! # Supplier Repository

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use tally_core::validation::validate_name;
use tally_core::Supplier;

/// Contact details for a new supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSupplier {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl NewSupplier {
    pub fn named(name: impl Into<String>) -> Self {
        NewSupplier {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Repository for suppliers. Names are unique.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn insert(&self, new: &NewSupplier) -> DbResult<Supplier> {
        validate_name("supplier name", &new.name)?;

        let supplier = Supplier {
            id: generate_id(),
            name: new.name.trim().to_string(),
            contact: new.contact.clone(),
            phone: new.phone.clone(),
            email: new.email.clone(),
        };

        debug!(name = %supplier.name, "Inserting supplier");

        sqlx::query(
            "INSERT INTO suppliers (id, name, contact, phone, email) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_key("supplier", &supplier.name))?;

        Ok(supplier)
    }

    /// All suppliers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, phone, email FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact, phone, email FROM suppliers WHERE name = ?1",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Finds a supplier by name, creating a bare record if absent.
    pub async fn get_or_create(&self, name: &str) -> DbResult<Supplier> {
        if let Some(existing) = self.get_by_name(name).await? {
            return Ok(existing);
        }
        self.insert(&NewSupplier::named(name)).await
    }
}
