//! Postgres-backed user store.
//!
//! Email uniqueness among active identities is enforced by a partial
//! unique index (`WHERE deleted_at IS NULL`), so a racing signup loses at
//! the database and surfaces as [`StoreError::Conflict`] regardless of
//! what the service's pre-check saw.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use async_trait::async_trait;
use keygate_auth::{StoreError, UserStore};
use keygate_core::{Identity, IdentityUpdate, NewIdentity, UserId};

/// Postgres unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table and its partial unique index if absent.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id            BIGSERIAL PRIMARY KEY,
                email         TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                first_name    TEXT,
                last_name     TEXT,
                level         INTEGER NOT NULL DEFAULT 1,
                created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                deleted_at    TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS users_active_email
            ON users (email)
            WHERE deleted_at IS NULL
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }
}

fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::Conflict("active identity already holds that email".to_string());
        }
    }
    StoreError::Unavailable(err.to_string())
}

fn identity_from_row(row: &sqlx::postgres::PgRow) -> Result<Identity, StoreError> {
    let read = |e: sqlx::Error| StoreError::Unavailable(e.to_string());
    Ok(Identity {
        id: UserId::new(row.try_get::<i64, _>("id").map_err(read)?),
        email: row.try_get("email").map_err(read)?,
        password_hash: row.try_get("password_hash").map_err(read)?,
        first_name: row.try_get("first_name").map_err(read)?,
        last_name: row.try_get("last_name").map_err(read)?,
        level: row.try_get("level").map_err(read)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(read)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(read)?,
        deleted_at: row
            .try_get::<Option<DateTime<Utc>>, _>("deleted_at")
            .map_err(read)?,
    })
}

const COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, level, created_at, updated_at, deleted_at";

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_email(
        &self,
        email: &str,
        include_deleted: bool,
    ) -> Result<Option<Identity>, StoreError> {
        let sql = if include_deleted {
            format!("SELECT {COLUMNS} FROM users WHERE email = $1 ORDER BY id DESC LIMIT 1")
        } else {
            format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL")
        };

        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(identity_from_row).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        row.as_ref().map(identity_from_row).transpose()
    }

    async fn create(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, level)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.level)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        identity_from_row(&row)
    }

    async fn update(&self, id: UserId, changes: IdentityUpdate) -> Result<Identity, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET
                email         = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                first_name    = COALESCE($4, first_name),
                last_name     = COALESCE($5, last_name),
                level         = COALESCE($6, level),
                updated_at    = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(changes.level)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match row {
            Some(row) => identity_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn mark_deleted(&self, id: UserId) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<Identity>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter().map(identity_from_row).collect()
    }

    async fn list_deleted(&self) -> Result<Vec<Identity>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM users WHERE deleted_at IS NOT NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter().map(identity_from_row).collect()
    }
}
