//! # tally-core: Pure Business Logic for Tally POS
//!
//! This crate is the **heart** of Tally POS. It holds the cart, the pricing
//! rules and the role model as pure code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tally (CLI, apps/cli)                        │   │
//! │  │    product / category / user / sell / report subcommands        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tally-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ pricing │ │  auth   │  │   │
//! │  │   │ Product │ │  Money  │ │  Cart   │ │ Totals  │ │  Role   │  │   │
//! │  │   │  Sale   │ │ rounding│ │CartLine │ │ policy  │ │ argon2  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO DATABASE • NO FILES • NO LOGGING • PURE FUNCTIONS          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-db (Database Layer)                    │   │
//! │  │        SQLite, migrations, repositories, checkout, CSV          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Role, etc.)
//! - [`money`] - Decimal money and the half-up rounding rule
//! - [`cart`] - The pre-checkout cart
//! - [`pricing`] - Subtotal, discount, tax and total
//! - [`auth`] - Capabilities per role, password hashing
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::{Cart, Money, TaxRate};
//!
//! let mut cart = Cart::new(TaxRate::from_bps(700)); // 7%
//! cart.add_item("p1", "Widget", "19.99".parse().unwrap(), 2).unwrap();
//! cart.add_item("p2", "Gadget", Money::from_cents(500), 1).unwrap();
//!
//! let totals = cart.totals();
//! assert_eq!(totals.subtotal.to_string(), "44.98");
//! assert_eq!(totals.tax.to_string(), "3.15");
//! assert_eq!(totals.total.to_string(), "48.13");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tally_core::Money` instead of
// `use tally_core::money::Money`

pub use auth::{hash_password, verify_password, Capability, Operator};
pub use cart::{Cart, CartLine, Discount};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{round_money, Money};
pub use pricing::{CartTotals, PricingPolicy};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches typos at the register (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest unit price, discount amount or catalog price, in whole currency
/// units.
///
/// A full cart (`MAX_CART_ITEMS` lines of `MAX_ITEM_QUANTITY` at this price)
/// stays far inside both `Decimal` and `i64` cents.
pub const MAX_PRICE: i64 = 100_000_000;

/// Largest discount percentage.
pub const MAX_DISCOUNT_PERCENT: i64 = 100;
