//! # Auth
//!
//! Who may do what, and how passwords are stored.
//!
//! ## Capability Matrix
//! ```text
//! ┌──────────────────┬─────────┬─────────┬─────────┐
//! │ Capability       │ cashier │ manager │ admin   │
//! ├──────────────────┼─────────┼─────────┼─────────┤
//! │ Sell             │   ✓     │   ✓     │   ✓     │
//! │ ManageProducts   │         │   ✓     │   ✓     │
//! │ ViewReports      │         │   ✓     │   ✓     │
//! │ ManageUsers      │         │         │   ✓     │
//! └──────────────────┴─────────┴─────────┴─────────┘
//! ```
//!
//! ## Passwords
//! Stored as argon2 PHC strings (`$argon2id$v=19$...`). The salt lives inside
//! the string, so verification needs nothing else.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::{Role, User};

// =============================================================================
// Capabilities
// =============================================================================

/// An action gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Ring up sales.
    Sell,
    /// Add, edit, delete, import and restock products and categories.
    ManageProducts,
    /// Read sales and inventory reports.
    ViewReports,
    /// Create, list and delete user accounts.
    ManageUsers,
}

impl Capability {
    /// Human wording used in permission errors.
    pub const fn describe(&self) -> &'static str {
        match self {
            Capability::Sell => "sell",
            Capability::ManageProducts => "manage products",
            Capability::ViewReports => "view reports",
            Capability::ManageUsers => "manage users",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl Role {
    /// Capabilities granted to this role.
    pub const fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Cashier => &[Capability::Sell],
            Role::Manager => &[
                Capability::Sell,
                Capability::ManageProducts,
                Capability::ViewReports,
            ],
            Role::Admin => &[
                Capability::Sell,
                Capability::ManageProducts,
                Capability::ViewReports,
                Capability::ManageUsers,
            ],
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

// =============================================================================
// Operator
// =============================================================================

/// The authenticated user acting in the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl Operator {
    /// Fails with `InsufficientPermission` unless the role grants `capability`.
    pub fn require(&self, capability: Capability) -> CoreResult<()> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(CoreError::InsufficientPermission {
                role: self.role.to_string(),
                capability: capability.to_string(),
            })
        }
    }
}

impl From<User> for Operator {
    fn from(user: User) -> Self {
        Operator {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::PasswordHash(e.to_string()))
}

/// Checks a password against a stored PHC string.
///
/// A wrong password is `Ok(false)`; only an unparseable hash is an error.
pub fn verify_password(password: &str, stored_hash: &str) -> CoreResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CoreError::PasswordHash(format!("invalid stored hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// =============================================================================
// Unit Tests
// =============================================================================
