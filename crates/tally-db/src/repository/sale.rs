//! # Sale Repository
//!
//! Read access to persisted sales and their items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. BUILD CART (tally-core, in memory)                                 │
//! │     └── add_item / set_discount / update_quantity                      │
//! │                                                                         │
//! │  2. FINALIZE (crate::checkout, one transaction)                        │
//! │     └── sales + sale_items + stock deltas + inventory_history          │
//! │                                                                         │
//! │  3. READ BACK (this module)                                            │
//! │     └── get_by_id / get_items / list_recent                            │
//! │                                                                         │
//! │  Sales are immutable once written. A held sale is a sale row with      │
//! │  held = 1 and no stock effect.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::{money_from_cents, parse_money};
use tally_core::{PaymentMethod, Sale, SaleItem};

pub(crate) const SELECT_SALE: &str = r#"
    SELECT
        id,
        created_at,
        subtotal_cents,
        discount_cents,
        tax_cents,
        total_cents,
        payment_method,
        held,
        user_id
    FROM sales
"#;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SaleRow {
    id: String,
    created_at: DateTime<Utc>,
    subtotal_cents: i64,
    discount_cents: i64,
    tax_cents: i64,
    total_cents: i64,
    payment_method: PaymentMethod,
    held: bool,
    user_id: Option<String>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            created_at: row.created_at,
            subtotal: money_from_cents(row.subtotal_cents),
            discount: money_from_cents(row.discount_cents),
            tax: money_from_cents(row.tax_cents),
            total: money_from_cents(row.total_cents),
            payment_method: row.payment_method,
            held: row.held,
            user_id: row.user_id,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    id: String,
    sale_id: String,
    product_id: String,
    name_snapshot: String,
    quantity: i64,
    unit_price: String,
}

impl SaleItemRow {
    fn into_item(self) -> DbResult<SaleItem> {
        Ok(SaleItem {
            unit_price: parse_money("unit_price", &self.unit_price)?,
            id: self.id,
            sale_id: self.sale_id,
            product_id: self.product_id,
            name_snapshot: self.name_snapshot,
            quantity: self.quantity,
        })
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("{SELECT_SALE} WHERE id = ?1");
        let row = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Sale::from))
    }

    /// Gets all items for a sale, in cart order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT id, sale_id, product_id, name_snapshot, quantity, unit_price
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleItemRow::into_item).collect()
    }

    /// Most recent sales first, held ones included.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!("{SELECT_SALE} ORDER BY created_at DESC, rowid DESC LIMIT ?1");
        let rows = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Sale::from).collect())
    }

    /// Counts stored sales (held included).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
