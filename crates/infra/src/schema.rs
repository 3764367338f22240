//! Storage schema and connection setup.
//!
//! The schema is created on connect (`IF NOT EXISTS`); there is no migration
//! history beyond this initial table.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::StoreError;

const MAX_CONNECTIONS: u32 = 5;

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        name           TEXT    NOT NULL,
        email          TEXT    NOT NULL UNIQUE,
        phone          TEXT    NOT NULL,
        company        TEXT    NOT NULL,
        address_street TEXT    NOT NULL,
        address_city   TEXT    NOT NULL,
        address_zip    TEXT    NOT NULL,
        geo_lat        REAL    NOT NULL,
        geo_lng        REAL    NOT NULL,
        created_at     TEXT    NOT NULL,
        updated_at     TEXT    NOT NULL
    )
"#;

const CREATE_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_users_created_at ON users (created_at)";

/// Open a pool for `database_url` and make sure the schema exists.
///
/// In-memory databases live inside a single connection, so the pool is pinned
/// to one connection that is never recycled.
pub async fn connect(database_url: &str) -> Result<SqlitePool, StoreError> {
    if !database_url.starts_with("sqlite:") {
        return Err(StoreError::InvalidUrl(format!(
            "{database_url}: expected a sqlite: url"
        )));
    }
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StoreError::InvalidUrl(format!("{database_url}: {e}")))?
        .create_if_missing(true);

    let pool = if is_in_memory(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options.journal_mode(SqliteJournalMode::Wal))
            .await?
    };

    apply(&pool).await?;
    Ok(pool)
}

/// Create the `users` table and its index if missing.
pub async fn apply(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_CREATED_AT_INDEX).execute(pool).await?;
    tracing::debug!("users schema ready");
    Ok(())
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
