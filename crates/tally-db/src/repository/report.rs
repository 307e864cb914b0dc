//! # Report Repository
//!
//! Read-only aggregates over sales and inventory.
//!
//! ## Date Ranges
//! Ranges are inclusive calendar days in UTC: `start..=end` becomes the
//! half-open instant range `[start 00:00, end+1 00:00)`. Held sales never
//! count toward any sales figure.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{out_of_range, parse_money};
use crate::repository::sale::{SaleRow, SELECT_SALE};
use tally_core::{Money, Sale};

/// Totals over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub transactions: i64,
    pub revenue: Money,
    pub tax: Money,
    pub discount: Money,
    pub items_sold: i64,
}

/// One row of the best-sellers report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct BestSeller {
    pub product_id: String,
    pub name: String,
    pub quantity_sold: i64,
}

/// Stock valued at purchase price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryValuation {
    /// Σ purchase_price × stock, rounded.
    pub total: Money,
    pub products: usize,
    pub units: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    transactions: i64,
    revenue_cents: i64,
    tax_cents: i64,
    discount_cents: i64,
}

/// Repository for reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Transaction count, revenue, tax, discount and items sold.
    pub async fn sales_summary(&self, start: NaiveDate, end: NaiveDate) -> DbResult<SalesSummary> {
        let (from, to) = day_bounds(start, end);
        debug!(%start, %end, "Building sales summary");

        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                COUNT(*) AS transactions,
                COALESCE(SUM(total_cents), 0) AS revenue_cents,
                COALESCE(SUM(tax_cents), 0) AS tax_cents,
                COALESCE(SUM(discount_cents), 0) AS discount_cents
            FROM sales
            WHERE held = 0 AND created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let items_sold: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(si.quantity), 0)
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.held = 0 AND s.created_at >= ?1 AND s.created_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            transactions: row.transactions,
            revenue: Money::from_cents(row.revenue_cents),
            tax: Money::from_cents(row.tax_cents),
            discount: Money::from_cents(row.discount_cents),
            items_sold,
        })
    }

    /// Top products by quantity sold, descending.
    pub async fn best_selling_products(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: u32,
    ) -> DbResult<Vec<BestSeller>> {
        let (from, to) = day_bounds(start, end);

        let rows = sqlx::query_as::<_, BestSeller>(
            r#"
            SELECT p.id AS product_id, p.name AS name, SUM(si.quantity) AS quantity_sold
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            JOIN products p ON p.id = si.product_id
            WHERE s.held = 0 AND s.created_at >= ?1 AND s.created_at < ?2
            GROUP BY p.id, p.name
            ORDER BY quantity_sold DESC, p.name
            LIMIT ?3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Values current stock at purchase price.
    ///
    /// Summed in full precision and rounded once. Negative stock lowers the
    /// value.
    pub async fn inventory_valuation(&self) -> DbResult<InventoryValuation> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT purchase_price, stock FROM products")
                .fetch_all(&self.pool)
                .await?;

        let mut total = Money::ZERO;
        let mut units: i64 = 0;
        for (price, stock) in &rows {
            let value = parse_money("purchase_price", price)?
                .checked_multiply_quantity(*stock)
                .ok_or_else(|| out_of_range("inventory valuation"))?;
            total = total
                .checked_add(value)
                .ok_or_else(|| out_of_range("inventory valuation"))?;
            units = units
                .checked_add(*stock)
                .ok_or_else(|| out_of_range("inventory units"))?;
        }

        Ok(InventoryValuation {
            total: total.rounded(),
            products: rows.len(),
            units,
        })
    }

    /// Sales saved with the held flag, newest first.
    pub async fn held_sales(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("{SELECT_SALE} WHERE held = 1 ORDER BY created_at DESC, rowid DESC");
        let rows = sqlx::query_as::<_, SaleRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Sale::from).collect())
    }
}

/// Inclusive day range → half-open UTC instants.
fn day_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let from = start.and_time(chrono::NaiveTime::MIN).and_utc();
    let to = end
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDate::MAX)
        .and_time(chrono::NaiveTime::MIN)
        .and_utc();
    (from, to)
}

// =============================================================================
// Unit Tests
// =============================================================================
