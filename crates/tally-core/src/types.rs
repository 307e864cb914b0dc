//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  sale_id (FK)   │       │
//! │  │  sku (business) │   │  total/tax/disc │   │  product_id(FK) │       │
//! │  │  selling_price  │   │  held           │   │  unit_price     │       │
//! │  │  stock          │   │  user_id        │   │  (frozen)       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │ InventoryEntry  │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  change (±qty)  │   │  Cash           │       │
//! │  │  700 = 7%       │   │  reason         │   │  Card / Mobile  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: `sku` for products, `username` for users

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

/// Reason tag written to inventory history by checkout.
pub const SALE_REASON: &str = "sale";

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 700 bps = 7% = 0.07
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a multiplier (`700 bps → 0.07`).
    #[inline]
    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 4)
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.as_fraction() * Decimal::ONE_HUNDRED).normalize())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// Card on an external terminal.
    Card,
    /// Mobile wallet.
    Mobile,
}

impl PaymentMethod {
    /// Lowercase name as stored.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Mobile => "mobile",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" | "credit" | "debit" => Ok(PaymentMethod::Card),
            "mobile" | "wallet" => Ok(PaymentMethod::Mobile),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec!["cash".into(), "card".into(), "mobile".into()],
            }),
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// Operator role. Capabilities per role live in [`crate::auth`].
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full permissions.
    Admin,
    /// Products and reports.
    Manager,
    /// Sales only.
    Cashier,
}

impl Role {
    /// Lowercase name as stored.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Cashier => "cashier",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "cashier" => Ok(Role::Cashier),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".into(), "manager".into(), "cashier".into()],
            }),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier.
    pub name: String,

    /// Stock Keeping Unit - unique business identifier.
    pub sku: String,

    /// What the store paid per unit (inventory valuation).
    pub purchase_price: Money,

    /// Current catalog price. Copied into the cart when added.
    pub selling_price: Money,

    /// Quantity on hand. May go negative (no backorder floor).
    pub stock: i64,

    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,

    /// Reorder threshold for the low-stock report.
    pub min_stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when stock has fallen to or below the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// Input for creating a product. The id and timestamps are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub purchase_price: Money,
    pub selling_price: Money,
    pub stock: i64,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub min_stock: i64,
}

impl NewProduct {
    /// Minimal product: name, SKU and prices; everything else defaulted.
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        purchase_price: Money,
        selling_price: Money,
    ) -> Self {
        NewProduct {
            name: name.into(),
            sku: sku.into(),
            purchase_price,
            selling_price,
            stock: 0,
            category_id: None,
            supplier_id: None,
            description: None,
            image_path: None,
            min_stock: 0,
        }
    }

    /// Sets the opening stock level.
    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }
}

/// Partial product update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub purchase_price: Option<Money>,
    pub selling_price: Option<Money>,
    pub stock: Option<i64>,
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub min_stock: Option<i64>,
}

impl ProductUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        *self == ProductUpdate::default()
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// A product supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted sale. Created exactly once per successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    /// Saved without touching stock (suspended transaction).
    pub held: bool,
    /// Operator credited with the sale.
    pub user_id: Option<String>,
}

/// A line item in a sale.
/// Uses snapshot pattern to freeze cart data at time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Display name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price as it was in the cart, never re-read from the catalog.
    pub unit_price: Money,
}

impl SaleItem {
    /// Line total, rounded for display.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity).rounded()
    }
}

// =============================================================================
// Inventory History
// =============================================================================

/// Append-only stock audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryEntry {
    pub id: String,
    pub product_id: String,
    /// Signed quantity delta (negative for stock-out).
    pub change: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// A user account. The password hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tax_rate_fraction() {
        let rate = TaxRate::from_bps(700);
        assert_eq!(rate.bps(), 700);
        assert_eq!(rate.as_fraction(), dec!(0.07));
        assert_eq!(rate.to_string(), "7%");
        assert_eq!(TaxRate::from_bps(825).to_string(), "8.25%");
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("Debit".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("mobile".parse::<PaymentMethod>().unwrap(), PaymentMethod::Mobile);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("MANAGER".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!(Role::Cashier.to_string(), "cashier");
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_product_update_is_empty() {
        assert!(ProductUpdate::default().is_empty());
        let update = ProductUpdate {
            stock: Some(3),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_sale_item_line_total() {
        let item = SaleItem {
            id: "i".into(),
            sale_id: "s".into(),
            product_id: "p".into(),
            name_snapshot: "Widget".into(),
            quantity: 3,
            unit_price: Money::new(dec!(3.335)),
        };
        assert_eq!(item.line_total(), Money::from_cents(1001));
    }
}
