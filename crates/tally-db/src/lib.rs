//! # tally-db: Database Layer for Tally POS
//!
//! This crate provides database access for the Tally POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  CLI command (tally sell --item W-1:2)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tally-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌──────────────────┐   │   │
//! │  │   │   Database    │  │ Repositories  │  │ Checkout         │   │   │
//! │  │   │   (pool.rs)   │  │ product, user │  │ (one tx per sale)│   │   │
//! │  │   │               │  │ sale, report  │  ├──────────────────┤   │   │
//! │  │   │ SqlitePool    │◄─│ category, ... │  │ csv_io           │   │   │
//! │  │   │ + migrations  │  │               │  │ (import/export)  │   │   │
//! │  │   └───────────────┘  └───────────────┘  └──────────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`checkout`] - Sale finalization transaction
//! - [`csv_io`] - Catalog CSV import and export
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/tally.db")).await?;
//! let hits = db.products().search("widget").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod csv_io;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::Checkout;
pub use csv_io::{export_products, import_products, ImportReport};
pub use error::{DbError, DbResult};
pub use migrations::SchemaStatus;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::product::{ProductListing, ProductRepository};
pub use repository::report::{BestSeller, InventoryValuation, ReportRepository, SalesSummary};
pub use repository::sale::SaleRepository;
pub use repository::supplier::{NewSupplier, SupplierRepository};
pub use repository::user::UserRepository;
