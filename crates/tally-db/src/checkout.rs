//! # Checkout
//!
//! Turns a priced cart into a persisted sale, atomically.
//!
//! ## Finalize Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  finalize(cart, payment, operator, held)                                │
//! │       │                                                                 │
//! │       ├── cart empty? ──────────────────────────► Err(EmptyCart)        │
//! │       │                                           (nothing written)     │
//! │       ▼                                                                 │
//! │  totals = price(cart)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────────┐   │
//! │  │ INSERT sales (cents, payment, held, user)                        │   │
//! │  │ for each line:                                                   │   │
//! │  │   INSERT sale_items (cart unit price, name snapshot)             │   │
//! │  │   UPDATE products SET stock = stock - qty      (skipped if held) │   │
//! │  │   INSERT inventory_history (-qty or 0, "sale")                   │   │
//! │  COMMIT ◄───────── any error ──► ROLLBACK, cart untouched ──► Err ──┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart.clear() ──► Ok(sale_id)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock has no floor: selling more than is on hand drives it negative.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::repository::inventory::record_change;
use crate::repository::{generate_id, money_to_cents};
use tally_core::{Cart, CartTotals, CoreError, PaymentMethod, SALE_REASON};

/// Sale finalization service.
#[derive(Debug, Clone)]
pub struct Checkout {
    pool: SqlitePool,
}

impl Checkout {
    pub fn new(pool: SqlitePool) -> Self {
        Checkout { pool }
    }

    /// Persists the cart as a sale and clears it.
    ///
    /// ## Arguments
    /// * `cart` - Priced from its state at this moment
    /// * `payment_method` - Recorded on the sale
    /// * `user_id` - Operator credited with the sale
    /// * `held` - Save without moving stock (history deltas are 0)
    ///
    /// ## Returns
    /// * `Ok(sale_id)` - Committed; the cart is now empty
    /// * `Err(_)` - Rolled back; the cart is exactly as it was
    pub async fn finalize(
        &self,
        cart: &mut Cart,
        payment_method: PaymentMethod,
        user_id: Option<&str>,
        held: bool,
    ) -> DbResult<String> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let totals = cart.totals();
        let sale_id = generate_id();
        let now = Utc::now();

        debug!(
            sale_id = %sale_id,
            lines = cart.line_count(),
            total = %totals.total,
            held,
            "Finalizing sale"
        );

        let mut tx = self.pool.begin().await?;

        let written = write_sale(
            &mut tx,
            &sale_id,
            now,
            cart,
            &totals,
            payment_method,
            user_id,
            held,
        )
        .await;

        if let Err(err) = written {
            warn!(sale_id = %sale_id, error = %err, "Checkout failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            return Err(err);
        }

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            total = %totals.total,
            payment = %payment_method,
            held,
            "Sale committed"
        );

        cart.clear();
        Ok(sale_id)
    }
}

#[allow(clippy::too_many_arguments)]
async fn write_sale(
    conn: &mut SqliteConnection,
    sale_id: &str,
    now: DateTime<Utc>,
    cart: &Cart,
    totals: &CartTotals,
    payment_method: PaymentMethod,
    user_id: Option<&str>,
    held: bool,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, created_at,
            subtotal_cents, discount_cents, tax_cents, total_cents,
            payment_method, held, user_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(sale_id)
    .bind(now)
    .bind(money_to_cents("subtotal", totals.subtotal)?)
    .bind(money_to_cents("discount", totals.discount)?)
    .bind(money_to_cents("tax", totals.tax)?)
    .bind(money_to_cents("total", totals.total)?)
    .bind(payment_method)
    .bind(held)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    for line in cart.lines() {
        sqlx::query(
            r#"
            INSERT INTO sale_items (id, sale_id, product_id, name_snapshot, quantity, unit_price)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(generate_id())
        .bind(sale_id)
        .bind(&line.product_id)
        .bind(&line.name)
        .bind(line.quantity)
        .bind(line.unit_price.to_storage_string())
        .execute(&mut *conn)
        .await?;

        let change = if held {
            0
        } else {
            sqlx::query("UPDATE products SET stock = stock - ?2, updated_at = ?3 WHERE id = ?1")
                .bind(&line.product_id)
                .bind(line.quantity)
                .bind(now)
                .execute(&mut *conn)
                .await?;
            -line.quantity
        };

        record_change(&mut *conn, &line.product_id, change, SALE_REASON).await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
