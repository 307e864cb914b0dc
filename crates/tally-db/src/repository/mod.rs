//! # Repository Module
//!
//! Database repository implementations for Tally POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI command                                                            │
//! │       │                                                                 │
//! │       │  db.products().search("widget")                                 │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── search(&self, query)                                               │
//! │  ├── get_by_sku(&self, sku)                                             │
//! │  ├── insert(&self, new_product)                                         │
//! │  └── adjust_stock(&self, id, delta, reason)                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD, search, stock
//! - [`CategoryRepository`](category::CategoryRepository) - Categories
//! - [`SupplierRepository`](supplier::SupplierRepository) - Suppliers
//! - [`UserRepository`](user::UserRepository) - Accounts and login
//! - [`SaleRepository`](sale::SaleRepository) - Persisted sales (read side)
//! - [`InventoryRepository`](inventory::InventoryRepository) - Stock audit trail
//! - [`ReportRepository`](report::ReportRepository) - Aggregates
//!
//! Sales are written only by [`Checkout`](crate::checkout::Checkout).

pub mod category;
pub mod inventory;
pub mod product;
pub mod report;
pub mod sale;
pub mod supplier;
pub mod user;

use tally_core::{Money, ValidationError};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Generates a new entity id (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Decodes a decimal TEXT column into `Money`.
pub(crate) fn parse_money(column: &str, raw: &str) -> DbResult<Money> {
    raw.parse::<Money>()
        .map_err(|_| DbError::corrupt(column, raw))
}

/// Turns stored INTEGER cents back into `Money`.
pub(crate) fn money_from_cents(cents: i64) -> Money {
    Money::from_cents(cents)
}

/// Encodes a rounded figure as INTEGER cents.
///
/// A figure too large for `i64` cents is an input error, not a storage one.
pub(crate) fn money_to_cents(column: &str, value: Money) -> DbResult<i64> {
    value.to_cents().ok_or_else(|| out_of_range(column))
}

/// The amount does not fit the stored representation.
pub(crate) fn out_of_range(field: &str) -> DbError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: i64::MIN / 100,
        max: i64::MAX / 100,
    }
    .into()
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
