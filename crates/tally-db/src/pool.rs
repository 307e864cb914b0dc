//! # Database Handle
//!
//! [`DbConfig`] describes where the store lives and how many connections to
//! keep; [`Database`] owns the resulting pool and hands out repositories.
//!
//! ```text
//! DbConfig::new("tally.db")              DbConfig::in_memory()
//!   WAL journal, NORMAL sync               default journal
//!   up to 5 connections                    exactly 1 connection, kept forever
//!   parent directory created               (a second connection would open
//!                                           a different, empty database)
//!          │                                        │
//!          └──────────────► Database::new ◄─────────┘
//!                               │  foreign_keys = ON, migrations applied
//!                               ▼
//!   products() categories() suppliers() users() sales()
//!   inventory() reports() checkout()
//! ```
//!
//! Repositories are cheap handles over a clone of the pool; create them per
//! call instead of storing them.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::checkout::Checkout;
use crate::error::{DbError, DbResult};
use crate::migrations::{self, SchemaStatus};
use crate::repository::category::CategoryRepository;
use crate::repository::inventory::InventoryRepository;
use crate::repository::product::ProductRepository;
use crate::repository::report::ReportRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::supplier::SupplierRepository;
use crate::repository::user::UserRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/tally.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection acquire timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection; `None` keeps them forever.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file (and its parent directory) is created if missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let db = Database::new(DbConfig::in_memory()).await?;
    /// // Isolated and migrated, gone when dropped
    /// ```
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    /// True for the `:memory:` configuration.
    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                .foreign_keys(true);
            return Ok(options);
        }

        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(SqliteConnectOptions::new()
            .filename(&self.database_path)
            // Readers don't block the single writer
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite has them disabled by default for backwards compatibility
            .foreign_keys(true)
            // Concurrent checkouts queue for the write lock
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cloning is cheap: every clone shares the same pool.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./tally.db")).await?;
/// let product = db.products().get_by_sku("W-1").await?;
/// let sale_id = db.checkout().finalize(&mut cart, PaymentMethod::Cash, Some(&user_id), false).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl Database {
    /// Creates a new database connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite (WAL, NORMAL synchronous, foreign keys)
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(if config.is_in_memory() {
                None
            } else {
                Some(Duration::from_secs(1800))
            })
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Embedded vs. applied migration counts.
    pub async fn schema_status(&self) -> DbResult<SchemaStatus> {
        migrations::schema_status(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.pool.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Returns the checkout service (sale finalization).
    pub fn checkout(&self) -> Checkout {
        Checkout::new(self.pool.clone())
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
        assert!(db.schema_status().await.unwrap().is_current());
    }

    #[tokio::test]
    async fn test_migrations_deferred_then_applied() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        let status = db.schema_status().await.unwrap();
        assert_eq!(status.applied, 0);
        assert!(!status.is_current());

        db.run_migrations().await.unwrap();
        db.run_migrations().await.unwrap();
        let status = db.schema_status().await.unwrap();
        assert_eq!(status.applied, status.embedded);
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        a.categories().insert("Drinks", None).await.unwrap();
        assert_eq!(b.categories().list().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_file_database_created_with_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tally.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(db.health_check().await);
        db.close().await;

        assert!(path.exists());
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }
}
