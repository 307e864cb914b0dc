//! # Money Module
//!
//! Provides the `Money` type and the [`round_money`] rule every monetary
//! figure in Tally POS passes through.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │    10.005 is stored as 10.004999... → rounds to 10.00  ❌               │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal                                          │
//! │    0.1 + 0.2 = 0.3                                                      │
//! │    10.005 → round half-up → 10.01                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding Discipline
//! Intermediate sums keep full precision. Only a figure that is shown or
//! stored goes through [`round_money`], and it does so exactly once.
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use tally_core::money::{round_money, Money};
//!
//! let price: Money = "19.99".parse().unwrap();
//! let line = price * 2;
//! assert_eq!(line.to_string(), "39.98");
//!
//! let tie = Decimal::new(10005, 3); // 10.005
//! assert_eq!(round_money(tie), Decimal::new(1001, 2));
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

/// Number of fractional digits for every presented or stored figure.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a decimal value to two fractional digits, ties away from zero.
///
/// This is round-half-up in the accounting sense: `10.005 → 10.01` and
/// `-10.005 → -10.01`. It is deliberately NOT round-half-to-even.
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount backed by an exact decimal.
///
/// ## Design Decisions
/// - **Signed**: discounts can push a taxable base below zero
/// - **Unrounded until asked**: `unit_price × quantity` keeps every digit;
///   call [`Money::rounded`] at the point a figure is exposed
/// - **Serde as string**: `"48.13"`, never a float
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps a decimal without rounding.
    #[inline]
    pub const fn new(value: Decimal) -> Self {
        Money(value)
    }

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(4813).to_string(), "48.13");
    /// assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MONEY_SCALE))
    }

    /// Returns the value in cents after rounding half-up.
    ///
    /// Returns `None` only when the amount does not fit an `i64` of cents.
    pub fn to_cents(&self) -> Option<i64> {
        (round_money(self.0) * Decimal::ONE_HUNDRED).to_i64()
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns this amount rounded to two places, half-up.
    #[inline]
    pub fn rounded(&self) -> Money {
        Money(round_money(self.0))
    }

    /// Multiplies by a line quantity, keeping full precision.
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Money {
        Money(self.0 * Decimal::from(qty))
    }

    /// Like [`Money::multiply_quantity`], but `None` instead of overflowing.
    ///
    /// For unbounded quantities such as stock on hand.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Money> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Applies a percentage (e.g. `10` for 10%), keeping full precision.
    #[inline]
    pub fn percent_of(&self, percent: Decimal) -> Money {
        Money(self.0 * percent / Decimal::ONE_HUNDRED)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly below zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the larger of two amounts.
    #[inline]
    pub fn max(self, other: Money) -> Money {
        if self >= other {
            self
        } else {
            other
        }
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// Canonical text form used for storage (full precision, no trailing zeros).
    pub fn to_storage_string(&self) -> String {
        self.0.normalize().to_string()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount rounded to two places (`48.13`, `-5.50`, `0.00`).
///
/// No currency symbol: locale formatting belongs to the presentation layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = round_money(self.0);
        shown.rescale(MONEY_SCALE);
        if shown.is_zero() {
            shown.set_sign_positive(true);
        }
        f.pad(&shown.to_string())
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Money)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: format!("'{}' is not a decimal number", trimmed),
            })
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Multiplication by a decimal factor (tax rates).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up_not_half_even() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(0.125)), dec!(0.13));
        assert_eq!(round_money(dec!(2.665)), dec!(2.67));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
    }

    #[test]
    fn test_round_negative_ties_away_from_zero() {
        assert_eq!(round_money(dec!(-10.005)), dec!(-10.01));
        assert_eq!(round_money(dec!(-0.004)), dec!(0.00));
    }

    #[test]
    fn test_no_binary_float_drift() {
        let a: Money = "0.1".parse().unwrap();
        let b: Money = "0.2".parse().unwrap();
        assert_eq!((a + b).amount(), dec!(0.3));
        assert_eq!((a + b).to_string(), "0.30");
    }

    #[test]
    fn test_cents_round_trip() {
        let m = Money::from_cents(4813);
        assert_eq!(m.amount(), dec!(48.13));
        assert_eq!(m.to_cents(), Some(4813));

        let unrounded = Money::new(dec!(3.335));
        assert_eq!(unrounded.to_cents(), Some(334));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::new(dec!(10.005)).to_string(), "10.01");
        assert_eq!(format!("{:>8}", Money::from_cents(500)), "    5.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("19.99".parse::<Money>().unwrap().amount(), dec!(19.99));
        assert_eq!(" 5 ".parse::<Money>().unwrap().amount(), dec!(5));
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
    }

    #[test]
    fn test_multiply_keeps_precision() {
        let price = Money::new(dec!(3.335));
        assert_eq!((price * 3).amount(), dec!(10.005));
        assert_eq!((price * 3).rounded().amount(), dec!(10.01));
    }

    #[test]
    fn test_checked_arithmetic() {
        let price = Money::from_cents(1250);
        assert_eq!(price.checked_multiply_quantity(4), Some(Money::from_cents(5000)));
        assert_eq!(price.checked_add(price), Some(Money::from_cents(2500)));

        let huge = Money::new(Decimal::MAX);
        assert_eq!(huge.checked_multiply_quantity(2), None);
        assert_eq!(huge.checked_add(Money::from_cents(100)), None);
    }

    #[test]
    fn test_percent_of() {
        let subtotal = Money::from_cents(10000);
        assert_eq!(subtotal.percent_of(dec!(10)).amount(), dec!(10));
    }

    #[test]
    fn test_storage_string_is_canonical() {
        assert_eq!(Money::new(dec!(19.990)).to_storage_string(), "19.99");
        assert_eq!(Money::new(dec!(3.335)).to_storage_string(), "3.335");
        let back: Money = Money::new(dec!(3.335)).to_storage_string().parse().unwrap();
        assert_eq!(back.amount(), dec!(3.335));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::ZERO.is_zero());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Money::from_cents(4813)).unwrap();
        assert_eq!(json, "\"48.13\"");
    }
}
