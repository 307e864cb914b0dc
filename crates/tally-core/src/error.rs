//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Cart, checkout and permission failures         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures (wraps CoreError)  │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → CliError → terminal     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages carry the offending field or value so the CLI can print them
//! unchanged. Nothing in this crate logs.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted with no lines in the cart.
    ///
    /// Nothing is persisted when this is returned.
    #[error("Cannot finalize an empty cart")]
    EmptyCart,

    /// A quantity edit referenced a product that has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity would exceed the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// The operator's role does not grant the capability.
    ///
    /// ## User Workflow
    /// ```text
    /// cashier runs `report summary`
    ///      │
    ///      ▼
    /// Operator::require(Capability::ViewReports)
    ///      │
    ///      ▼
    /// InsufficientPermission { role: "cashier", capability: "view reports" }
    /// ```
    #[error("Role {role} is not allowed to {capability}")]
    InsufficientPermission { role: String, capability: String },

    /// Password hashing or hash parsing failed.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the trust boundary (cart API, catalog input, CSV rows) before
/// anything is mutated.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., not a number, unknown enum value).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
