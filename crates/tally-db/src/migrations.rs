//! # Schema Migrations
//!
//! SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied in filename order on startup (`DbConfig::run_migrations`, on by
//! default). sqlx records each applied file in `_sqlx_migrations` and
//! refuses to start if an applied file was edited afterwards.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql   users, categories, suppliers, products,
//!                              sales, sale_items, inventory_history
//! ```
//!
//! New schema changes go in a new `NNN_description.sql` file.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far the schema is behind the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchemaStatus {
    /// Migrations compiled into this build.
    pub embedded: usize,
    /// Migrations recorded as applied in the database.
    pub applied: usize,
}

impl SchemaStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

/// Applies pending migrations. Already-applied files are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = schema_status(pool).await?;
    MIGRATOR.run(pool).await?;

    info!(
        embedded = before.embedded,
        newly_applied = before.embedded.saturating_sub(before.applied),
        "Schema up to date"
    );
    Ok(())
}

/// Counts embedded and applied migrations. A database that has never been
/// migrated reports zero applied.
pub async fn schema_status(pool: &SqlitePool) -> DbResult<SchemaStatus> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    let applied: i64 = if tracked == 0 {
        0
    } else {
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?
    };

    Ok(SchemaStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
    })
}
