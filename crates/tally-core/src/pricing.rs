//! # Pricing
//!
//! Derives the four sale figures from a cart.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines ──► Σ unit_price × qty (full precision) ──► round ──► subtotal   │
//! │                                                               │         │
//! │  percent ≠ 0 ? subtotal × percent / 100 : amount ──► round ──► discount │
//! │                                                               │         │
//! │  (subtotal − discount) × rate ─────────────────────► round ──► tax      │
//! │                                                               │         │
//! │  subtotal − discount + tax ────────────────────────► round ──► total    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every exposed figure is rounded exactly once with
//! [`round_money`](crate::money::round_money). Pricing never mutates the cart,
//! so calling it twice gives identical results.
//!
//! ## Discount Bound
//! By default a discount larger than the subtotal is applied as-is and the
//! taxable base (and so tax and total) can go negative. With
//! [`PricingPolicy::clamp_discount`] the discount is capped at the subtotal.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::money::Money;

/// Session-level pricing switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Cap the discount at the subtotal.
    pub clamp_discount: bool,
}

/// The four figures shown to the operator and written to the sale record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

/// Rounded sum of all line totals. An empty cart is `0.00`.
pub fn subtotal(cart: &Cart) -> Money {
    cart.lines()
        .iter()
        .map(CartLine::line_total)
        .sum::<Money>()
        .rounded()
}

/// Prices the cart in one pass.
pub fn price(cart: &Cart) -> CartTotals {
    let subtotal = subtotal(cart);

    let requested = cart.discount();
    let raw_discount = if requested.is_percent() {
        subtotal.percent_of(requested.percent)
    } else {
        requested.amount
    };
    let mut discount = raw_discount.rounded();
    if cart.policy().clamp_discount {
        discount = discount.min(subtotal);
    }

    let tax = ((subtotal - discount) * cart.tax_rate().as_fraction()).rounded();
    let total = (subtotal - discount + tax).rounded();

    CartTotals {
        subtotal,
        discount,
        tax,
        total,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxRate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_two_widgets_and_a_gadget() {
        let mut cart = Cart::new(TaxRate::from_bps(700));
        cart.add_item("w", "Widget", money("19.99"), 2).unwrap();
        cart.add_item("g", "Gadget", money("5.00"), 1).unwrap();

        let t = price(&cart);
        assert_eq!(t.subtotal, money("44.98"));
        assert_eq!(t.discount, Money::ZERO);
        assert_eq!(t.tax, money("3.15"));
        assert_eq!(t.total, money("48.13"));
    }

    #[test]
    fn test_tie_rounds_up() {
        let mut cart = Cart::new(TaxRate::zero());
        cart.add_item("x", "Odd", money("10.005"), 1).unwrap();
        assert_eq!(subtotal(&cart), money("10.01"));
    }

    #[test]
    fn test_subtotal_sums_before_rounding() {
        // 3 × 3.335 = 10.005 → 10.01; rounding each line first would give 10.02.
        let mut cart = Cart::new(TaxRate::zero());
        cart.add_item("a", "A", money("3.335"), 1).unwrap();
        cart.add_item("b", "B", money("3.335"), 1).unwrap();
        cart.add_item("c", "C", money("3.335"), 1).unwrap();
        assert_eq!(subtotal(&cart), money("10.01"));
    }

    #[test]
    fn test_percent_takes_precedence() {
        let mut cart = Cart::new(TaxRate::zero());
        cart.add_item("x", "Thing", money("100.00"), 1).unwrap();
        cart.set_discount(money("25.00"), dec!(10)).unwrap();

        assert_eq!(price(&cart).discount, money("10.00"));
        assert_eq!(price(&cart).total, money("90.00"));
    }

    #[test]
    fn test_flat_discount() {
        let mut cart = Cart::new(TaxRate::from_bps(700));
        cart.add_item("x", "Thing", money("100.00"), 1).unwrap();
        cart.set_discount(money("5.00"), Decimal::ZERO).unwrap();

        let t = price(&cart);
        assert_eq!(t.discount, money("5.00"));
        assert_eq!(t.tax, money("6.65"));
        assert_eq!(t.total, money("101.65"));
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let cart = Cart::new(TaxRate::from_bps(700));
        let t = price(&cart);
        assert_eq!(t.subtotal, Money::ZERO);
        assert_eq!(t.discount, Money::ZERO);
        assert_eq!(t.tax, Money::ZERO);
        assert_eq!(t.total, Money::ZERO);
    }

    #[test]
    fn test_oversized_discount_goes_negative_by_default() {
        let mut cart = Cart::new(TaxRate::from_bps(700));
        cart.add_item("x", "Thing", money("10.00"), 1).unwrap();
        cart.set_discount(money("20.00"), Decimal::ZERO).unwrap();

        let t = price(&cart);
        assert_eq!(t.discount, money("20.00"));
        assert_eq!(t.tax, money("-0.70"));
        assert_eq!(t.total, money("-10.70"));
    }

    #[test]
    fn test_clamp_policy_caps_discount() {
        let policy = PricingPolicy {
            clamp_discount: true,
        };
        let mut cart = Cart::with_policy(TaxRate::from_bps(700), policy);
        cart.add_item("x", "Thing", money("10.00"), 1).unwrap();
        cart.set_discount(money("20.00"), Decimal::ZERO).unwrap();

        let t = price(&cart);
        assert_eq!(t.discount, money("10.00"));
        assert_eq!(t.tax, Money::ZERO);
        assert_eq!(t.total, Money::ZERO);
    }

    #[test]
    fn test_pricing_is_idempotent() {
        let mut cart = Cart::new(TaxRate::from_bps(825));
        cart.add_item("a", "A", money("1.11"), 3).unwrap();
        cart.set_discount(Money::ZERO, dec!(12.5)).unwrap();

        assert_eq!(price(&cart), price(&cart));
        assert_eq!(cart.total(), cart.total());
    }

    #[test]
    fn test_total_identity_over_many_carts() {
        let prices = ["0.01", "0.99", "1.005", "2.50", "3.335", "19.99", "249.95"];
        let rates = [0u32, 500, 700, 825, 1000];

        for (i, rate) in rates.iter().enumerate() {
            for n in 1..prices.len() {
                let mut cart = Cart::new(TaxRate::from_bps(*rate));
                for (j, p) in prices.iter().take(n).enumerate() {
                    cart.add_item(format!("p{j}"), "Item", money(p), (j + i + 1) as i64)
                        .unwrap();
                }
                if n % 2 == 0 {
                    cart.set_discount(Money::ZERO, Decimal::from(n as i64 * 3))
                        .unwrap();
                } else {
                    cart.set_discount(money("1.25"), Decimal::ZERO).unwrap();
                }

                let t = price(&cart);
                assert_eq!(t.total, (t.subtotal - t.discount + t.tax).rounded());
                for figure in [t.subtotal, t.discount, t.tax, t.total] {
                    assert_eq!(figure, figure.rounded());
                }
            }
        }
    }
}
