//! # Cart
//!
//! The in-memory, pre-commit collection of line items for one checkout
//! session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Cart Method            State Change           │
//! │  ───────────────          ───────────            ────────────           │
//! │                                                                         │
//! │  Scan product ──────────► add_item() ──────────► merge or push line     │
//! │  Change quantity ───────► update_quantity() ───► lines[i].qty = n       │
//! │  Remove line ───────────► remove_item() ───────► retain (no-op if none) │
//! │  Apply discount ────────► set_discount() ──────► amount / percent       │
//! │  Cancel sale ───────────► clear() ─────────────► lines + discount reset │
//! │  Show totals ───────────► totals() ────────────► (read only)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! A cart is a plain value owned by one session and passed explicitly to
//! checkout. There is no shared or global cart, so no locking here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{self, CartTotals, PricingPolicy};
use crate::types::TaxRate;
use crate::validation::{
    validate_cart_size, validate_discount, validate_price, validate_quantity,
};
use crate::MAX_ITEM_QUANTITY;

// =============================================================================
// Cart Line
// =============================================================================

/// One product in the cart.
///
/// ## Price Freezing
/// `unit_price` is captured when the line is created and never changes,
/// even if the catalog price is edited before checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product reference (catalog id).
    pub product_id: String,

    /// Display name for the UI; not authoritative.
    pub name: String,

    /// Price per unit at time of adding (frozen, full precision).
    pub unit_price: Money,

    /// Always ≥ 1.
    pub quantity: i64,
}

impl CartLine {
    /// Unrounded `unit_price × quantity`.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// Cart-level discount. A non-zero `percent` wins over `amount` when pricing,
/// without clearing `amount`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Flat amount off the subtotal.
    pub amount: Money,
    /// Percentage off the subtotal (`10` = 10%).
    pub percent: Decimal,
}

impl Discount {
    /// True when the percentage applies.
    pub fn is_percent(&self) -> bool {
        !self.percent.is_zero()
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding again increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` distinct lines
/// - A rejected mutation leaves the cart exactly as it was
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount: Discount,
    tax_rate: TaxRate,
    policy: PricingPolicy,
}

impl Cart {
    /// Creates an empty cart with the session's tax rate.
    pub fn new(tax_rate: TaxRate) -> Self {
        Cart::with_policy(tax_rate, PricingPolicy::default())
    }

    /// Creates an empty cart with an explicit pricing policy.
    pub fn with_policy(tax_rate: TaxRate, policy: PricingPolicy) -> Self {
        Cart {
            lines: Vec::new(),
            discount: Discount::default(),
            tax_rate,
            policy,
        }
    }

    /// Adds a product or increases its quantity if already present.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity accumulates, the original unit
    ///   price is kept
    /// - Product not in cart: a new line is appended
    ///
    /// ## Errors
    /// - `quantity < 1`, or `unit_price` negative or above `MAX_PRICE`
    ///   → `CoreError::Validation`
    /// - merged quantity above 999 → `CoreError::QuantityTooLarge`
    /// - a new line beyond 100 lines → `CoreError::CartTooLarge`
    pub fn add_item(
        &mut self,
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> CoreResult<()> {
        let product_id = product_id.into();
        validate_quantity(quantity)?;
        validate_price("unit price", unit_price)?;

        if let Some(line) = self.line_mut(&product_id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        validate_cart_size(self.lines.len()).map_err(|_| CoreError::CartTooLarge {
            max: crate::MAX_CART_ITEMS,
        })?;

        self.lines.push(CartLine {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
        });
        Ok(())
    }

    /// Removes the line for `product_id`.
    ///
    /// Returns whether a line was removed; an absent product is a no-op.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    /// Sets a line's quantity explicitly.
    ///
    /// `0` removes the line. Negative quantities are rejected.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            if self.remove_item(product_id) {
                return Ok(());
            }
            return Err(CoreError::NotInCart(product_id.to_string()));
        }

        validate_quantity(quantity)?;

        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::NotInCart(product_id.to_string())),
        }
    }

    /// Stores both discount fields. Callers should set exactly one non-zero;
    /// if both are, the percentage wins at pricing time.
    pub fn set_discount(&mut self, amount: Money, percent: Decimal) -> CoreResult<()> {
        validate_discount(amount, percent)?;
        self.discount = Discount { amount, percent };
        Ok(())
    }

    /// Empties all lines and zeroes the discount. Tax rate and policy are
    /// session configuration and stay as they are.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount = Discount::default();
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Looks up a line by product.
    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn discount(&self) -> Discount {
        self.discount
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn policy(&self) -> PricingPolicy {
        self.policy
    }

    // -------------------------------------------------------------------------
    // Pricing shortcuts
    // -------------------------------------------------------------------------

    /// All four figures from one pricing pass.
    pub fn totals(&self) -> CartTotals {
        pricing::price(self)
    }

    pub fn subtotal(&self) -> Money {
        pricing::subtotal(self)
    }

    pub fn discount_value(&self) -> Money {
        self.totals().discount
    }

    pub fn tax_value(&self) -> Money {
        self.totals().tax
    }

    pub fn total(&self) -> Money {
        self.totals().total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::{MAX_CART_ITEMS, MAX_PRICE};
    use rust_decimal_macros::dec;

    fn cart() -> Cart {
        Cart::new(TaxRate::from_bps(700))
    }

    #[test]
    fn test_add_same_product_merges_quantity() {
        let mut cart = cart();
        cart.add_item("A", "Apple", Money::from_cents(199), 2).unwrap();
        cart.add_item("A", "Apple", Money::from_cents(199), 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.line("A").unwrap().quantity, 5);
    }

    #[test]
    fn test_merge_keeps_original_unit_price() {
        let mut cart = cart();
        cart.add_item("A", "Apple", Money::from_cents(199), 1).unwrap();
        cart.add_item("A", "Apple", Money::from_cents(250), 1).unwrap();

        assert_eq!(cart.line("A").unwrap().unit_price, Money::from_cents(199));
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = cart();
        cart.add_item("B", "Bread", Money::from_cents(300), 1).unwrap();
        cart.add_item("A", "Apple", Money::from_cents(100), 1).unwrap();

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = cart();
        cart.add_item("A", "Apple", Money::from_cents(100), 1).unwrap();
        let before = cart.clone();

        assert!(!cart.remove_item("missing"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_present() {
        let mut cart = cart();
        cart.add_item("A", "Apple", Money::from_cents(100), 1).unwrap();
        assert!(cart.remove_item("A"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let mut cart = cart();
        assert!(matches!(
            cart.add_item("A", "Apple", Money::from_cents(100), 0),
            Err(CoreError::Validation(_))
        ));
        assert!(cart
            .add_item("A", "Apple", Money::from_cents(100), -2)
            .is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_rejects_negative_price() {
        let mut cart = cart();
        assert!(cart
            .add_item("A", "Apple", Money::from_cents(-100), 1)
            .is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_rejects_price_above_ceiling() {
        let mut cart = cart();
        let huge: Money = "79228162514264337593543950335".parse().unwrap();
        let err = cart.add_item("X", "Big", huge, 2).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { max: MAX_PRICE, .. })
        ));
        assert!(cart.is_empty());

        cart.add_item("X", "Big", Money::new(Decimal::from(MAX_PRICE)), 1)
            .unwrap();
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_largest_cart_prices_into_cents() {
        let mut cart = Cart::new(TaxRate::from_bps(10_000));
        let top = Money::new(Decimal::from(MAX_PRICE));
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(format!("P{i}"), "Item", top, MAX_ITEM_QUANTITY)
                .unwrap();
        }

        let totals = cart.totals();
        // 100 lines × 999 × 100,000,000 = 9,990,000,000,000; tax doubles it
        assert_eq!(totals.subtotal, Money::new(dec!(9990000000000)));
        assert_eq!(totals.total, Money::new(dec!(19980000000000)));
        assert!(totals.total.to_cents().is_some());
    }

    #[test]
    fn test_merged_quantity_limit() {
        let mut cart = cart();
        cart.add_item("A", "Apple", Money::from_cents(100), 998).unwrap();
        let err = cart
            .add_item("A", "Apple", Money::from_cents(100), 2)
            .unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { requested: 1000, .. }));
        assert_eq!(cart.line("A").unwrap().quantity, 998);
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = cart();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(format!("P{i}"), "Item", Money::from_cents(100), 1)
                .unwrap();
        }
        let err = cart
            .add_item("overflow", "Item", Money::from_cents(100), 1)
            .unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));
        // Existing lines can still grow.
        cart.add_item("P0", "Item", Money::from_cents(100), 1).unwrap();
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = cart();
        cart.add_item("A", "Apple", Money::from_cents(100), 1).unwrap();

        cart.update_quantity("A", 7).unwrap();
        assert_eq!(cart.line("A").unwrap().quantity, 7);

        cart.update_quantity("A", 0).unwrap();
        assert!(cart.is_empty());

        assert!(matches!(
            cart.update_quantity("A", 3),
            Err(CoreError::NotInCart(_))
        ));
    }

    #[test]
    fn test_update_quantity_rejects_negative() {
        let mut cart = cart();
        cart.add_item("A", "Apple", Money::from_cents(100), 4).unwrap();
        assert!(cart.update_quantity("A", -1).is_err());
        assert_eq!(cart.line("A").unwrap().quantity, 4);
    }

    #[test]
    fn test_set_discount_keeps_both_fields() {
        let mut cart = cart();
        cart.set_discount(Money::from_cents(500), dec!(10)).unwrap();
        let d = cart.discount();
        assert_eq!(d.amount, Money::from_cents(500));
        assert_eq!(d.percent, dec!(10));
        assert!(d.is_percent());
    }

    #[test]
    fn test_set_discount_rejects_negative() {
        let mut cart = cart();
        assert!(cart.set_discount(Money::from_cents(-1), Decimal::ZERO).is_err());
        assert!(cart.set_discount(Money::ZERO, dec!(-10)).is_err());
        assert_eq!(cart.discount(), Discount::default());
    }

    #[test]
    fn test_clear_resets_lines_and_discount_not_tax() {
        let mut cart = cart();
        cart.add_item("A", "Apple", Money::from_cents(100), 1).unwrap();
        cart.set_discount(Money::from_cents(50), Decimal::ZERO).unwrap();

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.discount(), Discount::default());
        assert_eq!(cart.tax_rate(), TaxRate::from_bps(700));
    }

    #[test]
    fn test_total_quantity() {
        let mut cart = cart();
        cart.add_item("A", "Apple", Money::from_cents(100), 2).unwrap();
        cart.add_item("B", "Bread", Money::from_cents(100), 3).unwrap();
        assert_eq!(cart.total_quantity(), 5);
    }
}
