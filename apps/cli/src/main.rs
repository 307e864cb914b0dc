//! # Tally POS Command Line
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging                                                  │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • Default: info,tally=debug,sqlx=warn; override with RUST_LOG       │
//! │                                                                         │
//! │  2. Parse Arguments (clap)                                              │
//! │                                                                         │
//! │  3. Load PosConfig                                                      │
//! │     • --db flag, then TALLY_* variables, then defaults                  │
//! │                                                                         │
//! │  4. Open Database                                                       │
//! │     • SQLite with WAL mode, pending migrations applied                  │
//! │                                                                         │
//! │  5. Run Command                                                         │
//! │     • errors print as "error: <message>" and exit with status 1         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;
mod error;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = commands::Cli::parse();
    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tally_db=trace` - Show trace for the store only
/// - Default: INFO, DEBUG for tally crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
