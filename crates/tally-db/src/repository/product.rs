//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with SKU uniqueness
//! - Substring search over name and SKU
//! - Stock adjustments with an inventory history row
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, compute, write back                               │
//! │     SELECT stock ...; UPDATE products SET stock = 7                 │
//! │                                                                     │
//! │  ✅ CORRECT: single-statement delta                                 │
//! │     UPDATE products SET stock = stock + ?2 WHERE id = ?1            │
//! │                                                                     │
//! │  Every delta also appends one inventory_history row in the same     │
//! │  transaction, so the audit trail always sums to the stock level     │
//! │  change.                                                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::inventory::record_change;
use crate::repository::{generate_id, like_pattern, parse_money};
use tally_core::validation::{validate_name, validate_price, validate_search_query, validate_sku};
use tally_core::{NewProduct, Product, ProductUpdate};

const SELECT_PRODUCT: &str = r#"
    SELECT
        p.id,
        p.name,
        p.sku,
        p.purchase_price,
        p.selling_price,
        p.stock,
        p.category_id,
        p.supplier_id,
        p.description,
        p.image_path,
        p.min_stock,
        p.created_at,
        p.updated_at,
        c.name AS category_name,
        s.name AS supplier_name
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN suppliers s ON s.id = p.supplier_id
"#;

/// Raw `products` row joined with category/supplier names.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    sku: String,
    purchase_price: String,
    selling_price: String,
    stock: i64,
    category_id: Option<String>,
    supplier_id: Option<String>,
    description: Option<String>,
    image_path: Option<String>,
    min_stock: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: Option<String>,
    supplier_name: Option<String>,
}

impl ProductRow {
    fn into_listing(self) -> DbResult<ProductListing> {
        let product = Product {
            purchase_price: parse_money("purchase_price", &self.purchase_price)?,
            selling_price: parse_money("selling_price", &self.selling_price)?,
            id: self.id,
            name: self.name,
            sku: self.sku,
            stock: self.stock,
            category_id: self.category_id,
            supplier_id: self.supplier_id,
            description: self.description,
            image_path: self.image_path,
            min_stock: self.min_stock,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        Ok(ProductListing {
            product,
            category: self.category_name,
            supplier: self.supplier_name,
        })
    }

    fn into_product(self) -> DbResult<Product> {
        self.into_listing().map(|l| l.product)
    }
}

/// A product with its category and supplier names resolved, for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductListing {
    pub product: Product,
    pub category: Option<String>,
    pub supplier: Option<String>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product with a fresh id and timestamps.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The stored product
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    /// * `Err(DbError::Core(Validation))` - Empty name/SKU, or a price that is
    ///   negative or above `MAX_PRICE`
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        validate_name("name", &new.name)?;
        validate_sku(&new.sku)?;
        validate_price("purchase price", new.purchase_price)?;
        validate_price("selling price", new.selling_price)?;

        debug!(sku = %new.sku, "Inserting product");

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            name: new.name.trim().to_string(),
            sku: new.sku.trim().to_string(),
            purchase_price: new.purchase_price,
            selling_price: new.selling_price,
            stock: new.stock,
            category_id: new.category_id.clone(),
            supplier_id: new.supplier_id.clone(),
            description: new.description.clone(),
            image_path: new.image_path.clone(),
            min_stock: new.min_stock,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, sku, purchase_price, selling_price, stock,
                category_id, supplier_id, description, image_path, min_stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.purchase_price.to_storage_string())
        .bind(product.selling_price.to_storage_string())
        .bind(product.stock)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(&product.description)
        .bind(&product.image_path)
        .bind(product.min_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_key("sku", &product.sku))?;

        Ok(product)
    }

    /// Applies a partial update; `None` fields keep their stored value.
    ///
    /// ## Returns
    /// The product as stored after the update.
    pub async fn update(&self, id: &str, changes: &ProductUpdate) -> DbResult<Product> {
        let mut product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        if changes.is_empty() {
            return Ok(product);
        }

        if let Some(name) = &changes.name {
            validate_name("name", name)?;
            product.name = name.trim().to_string();
        }
        if let Some(sku) = &changes.sku {
            validate_sku(sku)?;
            product.sku = sku.trim().to_string();
        }
        if let Some(price) = changes.purchase_price {
            validate_price("purchase price", price)?;
            product.purchase_price = price;
        }
        if let Some(price) = changes.selling_price {
            validate_price("selling price", price)?;
            product.selling_price = price;
        }
        if let Some(stock) = changes.stock {
            product.stock = stock;
        }
        if let Some(category_id) = &changes.category_id {
            product.category_id = Some(category_id.clone());
        }
        if let Some(supplier_id) = &changes.supplier_id {
            product.supplier_id = Some(supplier_id.clone());
        }
        if let Some(description) = &changes.description {
            product.description = Some(description.clone());
        }
        if let Some(image_path) = &changes.image_path {
            product.image_path = Some(image_path.clone());
        }
        if let Some(min_stock) = changes.min_stock {
            product.min_stock = min_stock;
        }
        product.updated_at = Utc::now();

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                sku = ?3,
                purchase_price = ?4,
                selling_price = ?5,
                stock = ?6,
                category_id = ?7,
                supplier_id = ?8,
                description = ?9,
                image_path = ?10,
                min_stock = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(product.purchase_price.to_storage_string())
        .bind(product.selling_price.to_storage_string())
        .bind(product.stock)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(&product.description)
        .bind(&product.image_path)
        .bind(product.min_stock)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_key("sku", &product.sku))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(product)
    }

    /// Deletes a product.
    ///
    /// Fails with `ForeignKeyViolation` once sales or stock history
    /// reference it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.id = ?1");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(ProductRow::into_product)
            .transpose()
    }

    /// Gets a product by its SKU (exact match).
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.sku = ?1");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?
            .map(ProductRow::into_product)
            .transpose()
    }

    /// Case-insensitive substring search over name and SKU, ordered by name.
    ///
    /// An empty query lists everything.
    pub async fn search(&self, query: &str) -> DbResult<Vec<ProductListing>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, "Searching products");

        if query.is_empty() {
            return self.list_all().await;
        }

        let sql = format!(
            r"{SELECT_PRODUCT}
            WHERE p.name LIKE ?1 ESCAPE '\' OR p.sku LIKE ?1 ESCAPE '\'
            ORDER BY p.name"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(like_pattern(&query))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Search returned products");
        rows.into_iter().map(ProductRow::into_listing).collect()
    }

    /// Lists every product, ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<ProductListing>> {
        let sql = format!("{SELECT_PRODUCT} ORDER BY p.name");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ProductRow::into_listing).collect()
    }

    /// Products at or below their reorder threshold.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.stock <= p.min_stock ORDER BY p.stock, p.name");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Applies a manual stock delta and records it in inventory history.
    ///
    /// ## Arguments
    /// * `id` - Product ID
    /// * `delta` - Change in stock (negative for shrinkage, positive for restocking)
    /// * `reason` - Free-text tag stored with the history row
    ///
    /// ## Returns
    /// The stock level after the change.
    pub async fn adjust_stock(&self, id: &str, delta: i64, reason: &str) -> DbResult<i64> {
        validate_name("reason", reason)?;

        debug!(id = %id, delta = %delta, reason = %reason, "Adjusting stock");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        record_change(&mut tx, id, delta, reason.trim()).await?;

        let stock: i64 = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %id, delta = %delta, stock = %stock, "Stock adjusted");
        Ok(stock)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use tally_core::{CoreError, Money, NewProduct, ProductUpdate};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn widget() -> NewProduct {
        NewProduct::new("Widget", "W-1", Money::from_cents(1200), Money::from_cents(1999))
            .with_stock(10)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let product = db.products().insert(&widget()).await.unwrap();

        let by_id = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(by_id.sku, "W-1");
        assert_eq!(by_id.selling_price, Money::from_cents(1999));
        assert_eq!(by_id.stock, 10);

        let by_sku = db.products().get_by_sku("W-1").await.unwrap().unwrap();
        assert_eq!(by_sku.id, product.id);

        assert!(db.products().get_by_sku("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_full_precision_price_survives_storage() {
        let db = db().await;
        let new = NewProduct::new("Odd", "ODD-1", Money::ZERO, "3.335".parse().unwrap());
        let product = db.products().insert(&new).await.unwrap();

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.selling_price, "3.335".parse::<Money>().unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = db().await;
        db.products().insert(&widget()).await.unwrap();

        let err = db.products().insert(&widget()).await.unwrap_err();
        assert_eq!(err.to_string(), "Duplicate sku: 'W-1' already exists");
    }

    #[tokio::test]
    async fn test_insert_rejects_negative_price() {
        let db = db().await;
        let bad = NewProduct::new("Bad", "BAD", Money::ZERO, Money::from_cents(-1));
        let err = db.products().insert(&bad).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = db().await;
        let product = db.products().insert(&widget()).await.unwrap();

        let changes = ProductUpdate {
            selling_price: Some(Money::from_cents(2499)),
            description: Some("Blue".to_string()),
            ..Default::default()
        };
        let updated = db.products().update(&product.id, &changes).await.unwrap();

        assert_eq!(updated.selling_price, Money::from_cents(2499));
        assert_eq!(updated.name, "Widget");
        assert_eq!(updated.description.as_deref(), Some("Blue"));

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.selling_price, Money::from_cents(2499));
        assert_eq!(stored.purchase_price, Money::from_cents(1200));
        assert_eq!(stored.description.as_deref(), Some("Blue"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = db().await;
        let changes = ProductUpdate {
            name: Some("X".to_string()),
            ..Default::default()
        };
        let err = db.products().update("missing", &changes).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = db().await;
        let product = db.products().insert(&widget()).await.unwrap();

        db.products().delete(&product.id).await.unwrap();
        assert!(db.products().get_by_id(&product.id).await.unwrap().is_none());
        assert!(matches!(
            db.products().delete(&product.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_matches_name_or_sku_case_insensitive() {
        let db = db().await;
        let category = db.categories().insert("Hardware", None).await.unwrap();

        let mut widget = widget();
        widget.category_id = Some(category.id.clone());
        db.products().insert(&widget).await.unwrap();
        db.products()
            .insert(&NewProduct::new("Gadget", "G-1", Money::ZERO, Money::from_cents(500)))
            .await
            .unwrap();

        let hits = db.products().search("widg").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category.as_deref(), Some("Hardware"));

        let hits = db.products().search("g-1").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product.name, "Gadget");

        let all = db.products().search("  ").await.unwrap();
        let names: Vec<&str> = all.iter().map(|l| l.product.name.as_str()).collect();
        assert_eq!(names, vec!["Gadget", "Widget"]);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let db = db().await;
        db.products().insert(&widget()).await.unwrap();
        assert!(db.products().search("%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_adjust_stock_writes_history() {
        let db = db().await;
        let product = db.products().insert(&widget()).await.unwrap();

        let stock = db
            .products()
            .adjust_stock(&product.id, 5, "restock")
            .await
            .unwrap();
        assert_eq!(stock, 15);

        let stock = db
            .products()
            .adjust_stock(&product.id, -20, "shrinkage")
            .await
            .unwrap();
        assert_eq!(stock, -5);

        let history = db.inventory().history_for_product(&product.id).await.unwrap();
        let changes: Vec<(i64, &str)> = history
            .iter()
            .map(|h| (h.change, h.reason.as_str()))
            .collect();
        assert_eq!(changes, vec![(5, "restock"), (-20, "shrinkage")]);
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_product_writes_nothing() {
        let db = db().await;
        let err = db
            .products()
            .adjust_stock("missing", 1, "restock")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM inventory_history")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = db().await;
        let mut low = NewProduct::new("Low", "LOW", Money::ZERO, Money::from_cents(100));
        low.min_stock = 5;
        low.stock = 2;
        db.products().insert(&low).await.unwrap();
        db.products().insert(&widget()).await.unwrap();

        let flagged = db.products().low_stock().await.unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].sku, "LOW");
        assert!(flagged[0].is_low_stock());
    }
}
