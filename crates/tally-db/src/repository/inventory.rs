//! # Inventory History
//!
//! Append-only audit of stock movements. Rows are written only inside the
//! transaction that moves the stock (checkout or a manual adjustment) and
//! are never updated or deleted.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;
use crate::repository::generate_id;
use tally_core::InventoryEntry;

/// Appends one history row on an open connection or transaction.
pub(crate) async fn record_change(
    conn: &mut SqliteConnection,
    product_id: &str,
    change: i64,
    reason: &str,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO inventory_history (id, product_id, change, reason, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(generate_id())
    .bind(product_id)
    .bind(change)
    .bind(reason)
    .bind(Utc::now())
    .execute(conn)
    .await?;

    Ok(())
}

/// Read access to inventory history.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// All movements for a product, oldest first.
    pub async fn history_for_product(&self, product_id: &str) -> DbResult<Vec<InventoryEntry>> {
        let entries = sqlx::query_as::<_, InventoryEntry>(
            r#"
            SELECT id, product_id, change, reason, created_at
            FROM inventory_history
            WHERE product_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
