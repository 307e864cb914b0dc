//! # User Repository
//!
//! Accounts, password login, and the operator handed to the rest of the app.
//!
//! ## Login Flow
//! ```text
//! username + password
//!      │
//!      ▼
//! SELECT ... WHERE username = ?      ── no row ──► Ok(None)
//!      │
//!      ▼
//! argon2 verify(password, stored PHC) ── mismatch ─► Ok(None)
//!      │
//!      ▼
//! Ok(Some(Operator { user_id, username, role }))
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use tally_core::validation::{validate_password, validate_username};
use tally_core::{hash_password, verify_password, Operator, Role, User};

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: String,
    username: String,
    password_hash: String,
    role: Role,
}

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an account with an argon2-hashed password.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Username already taken
    pub async fn create(&self, username: &str, password: &str, role: Role) -> DbResult<User> {
        validate_username(username)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        let user = User {
            id: generate_id(),
            username: username.to_string(),
            role,
            created_at: Utc::now(),
        };

        debug!(username = %user.username, role = %role, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_key("username", &user.username))?;

        info!(username = %user.username, "User created");
        Ok(user)
    }

    /// Verifies credentials.
    ///
    /// Unknown users and wrong passwords both yield `Ok(None)`.
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<Option<Operator>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, username, password_hash, role
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            warn!(username = %username, "Login failed: unknown user");
            return Ok(None);
        };

        if !verify_password(password, &row.password_hash)? {
            warn!(username = %username, "Login failed: wrong password");
            return Ok(None);
        }

        debug!(username = %username, role = %row.role, "Login succeeded");
        Ok(Some(Operator {
            user_id: row.id,
            username: row.username,
            role: row.role,
        }))
    }

    /// All users ordered by username.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, role, created_at FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, role, created_at FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Deletes an account. Past sales keep their rows with the operator
    /// reference cleared.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
