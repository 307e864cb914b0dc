//! # Configuration
//!
//! Loaded once at startup from environment variables with fallback to
//! defaults.
//!
//! ## Sources (Priority Order)
//! 1. Command line flags (`--db`)
//! 2. Environment variables (`TALLY_*`)
//! 3. Defaults (this file)
//!
//! | Variable               | Default                         |
//! |------------------------|---------------------------------|
//! | `TALLY_DB_PATH`        | `<platform data dir>/tally.db`  |
//! | `TALLY_TAX_RATE_BPS`   | `700` (7%)                      |
//! | `TALLY_CLAMP_DISCOUNT` | `false`                         |
//! | `TALLY_STORE_NAME`     | `Tally POS`                     |

use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;

use tally_core::validation::validate_tax_rate_bps;
use tally_core::{Cart, PricingPolicy, TaxRate};

pub const DEFAULT_TAX_RATE_BPS: u32 = 700;
pub const DEFAULT_STORE_NAME: &str = "Tally POS";

/// Session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PosConfig {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Tax applied to every new cart.
    pub tax_rate: TaxRate,

    /// Cap discounts at the subtotal.
    pub clamp_discount: bool,

    /// Printed on receipts.
    pub store_name: String,
}

impl PosConfig {
    /// Loads configuration from the process environment. `db_override` is the
    /// `--db` flag and wins over `TALLY_DB_PATH`.
    pub fn load(db_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok(), db_override)
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        db_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let db_path = match db_override.or_else(|| lookup("TALLY_DB_PATH").map(PathBuf::from)) {
            Some(path) => path,
            None => default_db_path()?,
        };

        let tax_rate_bps: u32 = match lookup("TALLY_TAX_RATE_BPS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TALLY_TAX_RATE_BPS".to_string()))?,
            None => DEFAULT_TAX_RATE_BPS,
        };
        validate_tax_rate_bps(tax_rate_bps)
            .map_err(|_| ConfigError::InvalidValue("TALLY_TAX_RATE_BPS".to_string()))?;

        let clamp_discount = match lookup("TALLY_CLAMP_DISCOUNT") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("TALLY_CLAMP_DISCOUNT".to_string()))?,
            None => false,
        };

        let store_name = lookup("TALLY_STORE_NAME")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STORE_NAME.to_string());

        Ok(PosConfig {
            db_path,
            tax_rate: TaxRate::from_bps(tax_rate_bps),
            clamp_discount,
            store_name,
        })
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            clamp_discount: self.clamp_discount,
        }
    }

    /// An empty cart carrying this session's tax rate and policy.
    pub fn new_cart(&self) -> Cart {
        Cart::with_policy(self.tax_rate, self.pricing_policy())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Platform data directory.
///
/// - **macOS**: `~/Library/Application Support/com.tally.pos/tally.db`
/// - **Windows**: `%APPDATA%\tally\pos\data\tally.db`
/// - **Linux**: `~/.local/share/pos/tally.db`
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "tally", "pos").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("tally.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine app data directory; set TALLY_DB_PATH")]
    NoDataDir,
}

// =============================================================================
// Unit Tests
// =============================================================================
