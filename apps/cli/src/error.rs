//! # CLI Error Type
//!
//! Every command returns `CliResult<()>`; `main` prints the message and exits
//! non-zero.
//!
//! ```text
//! DbError ─────────┐
//! CoreError ───────┼──► CliError ──► "error: <message>" on stderr, exit 1
//! ValidationError ─┤
//! ConfigError ─────┘
//! ```

use thiserror::Error;

use crate::config::ConfigError;
use tally_core::{CoreError, ValidationError};
use tally_db::DbError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// No `--user` given for a command that needs an operator.
    #[error("This command needs an operator: pass --user and --password")]
    LoginRequired,

    #[error("Invalid username or password")]
    LoginFailed,

    #[error("No product with SKU {0}")]
    UnknownSku(String),

    #[error("No user named {0}")]
    UnknownUser(String),

    /// A flag value that clap accepted but the command cannot use.
    #[error("{0}")]
    InvalidArgument(String),
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Core(CoreError::Validation(err))
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        let err: CliError = CoreError::EmptyCart.into();
        assert_eq!(err.to_string(), "Cannot finalize an empty cart");

        let err: CliError = ValidationError::Required {
            field: "sku".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Validation error: sku is required");

        assert_eq!(
            CliError::UnknownSku("W-1".into()).to_string(),
            "No product with SKU W-1"
        );
    }
}
