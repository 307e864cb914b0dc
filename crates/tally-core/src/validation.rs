//! # Validation Module
//!
//! Input validation at the trust boundary.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  └── Type validation (is it a number?)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by Cart, catalog input, CSV rows)        │
//! │  └── Business rule validation (positive quantity, non-negative price)  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (sku, username)                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_sku, validate_quantity};
//!
//! assert!(validate_sku("COKE-330").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_ITEMS, MAX_DISCOUNT_PERCENT, MAX_ITEM_QUANTITY, MAX_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Trimmed `value`, or `Required` / `TooLong` for `field`.
fn required_within<'a>(field: &str, value: &'a str, max: usize) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(value)
}

/// SKU: 1-50 characters of letters, digits, `-` and `_`.
///
/// ```rust
/// use tally_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = required_within("sku", sku, 50)?;
    if let Some(bad) = sku.chars().find(|c| !(c.is_alphanumeric() || *c == '-' || *c == '_')) {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: format!("'{bad}' is not allowed; use letters, digits, '-' or '_'"),
        });
    }
    Ok(())
}

/// Product, category, supplier or reason text: 1-200 characters.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    required_within(field, name, 200).map(|_| ())
}

/// Username: 1-50 characters, no whitespace anywhere.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    required_within("username", username, 50)?;
    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }
    Ok(())
}

/// Password: any non-empty string. Whitespace is significant.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

/// Search text, trimmed. Empty matches everything; at most 100 characters.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }
    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Line quantity: 1 to [`MAX_ITEM_QUANTITY`].
///
/// ```text
/// add_item(W-1, qty)
///   qty <= 0   → MustBePositive
///   qty > 999  → OutOfRange { min: 1, max: 999 }
///   otherwise  → line added or merged
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items); negative is not.
///
/// ```rust
/// use tally_core::money::Money;
/// use tally_core::validation::validate_price;
///
/// assert!(validate_price("unit price", Money::from_cents(1099)).is_ok());
/// assert!(validate_price("unit price", Money::ZERO).is_ok());
/// assert!(validate_price("unit price", Money::from_cents(-100)).is_err());
/// assert!(validate_price("unit price", Money::from_cents(100_000_000_01)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if price.amount() > Decimal::from(MAX_PRICE) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE,
        });
    }

    Ok(())
}

/// Validates a discount pair. Neither component may be negative, the amount
/// is capped like a price and the percent at [`MAX_DISCOUNT_PERCENT`].
pub fn validate_discount(amount: Money, percent: Decimal) -> ValidationResult<()> {
    validate_price("discount amount", amount)?;

    if percent.is_sign_negative() && !percent.is_zero() {
        return Err(ValidationError::MustNotBeNegative {
            field: "discount percent".to_string(),
        });
    }

    if percent > Decimal::from(MAX_DISCOUNT_PERCENT) {
        return Err(ValidationError::OutOfRange {
            field: "discount percent".to_string(),
            min: 0,
            max: MAX_DISCOUNT_PERCENT,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points: 0 to 10000 (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more distinct line fits in the cart.
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
