//! SQLite-backed user store.
//!
//! `UserStore` is the only handle to storage. It is constructed once by the
//! process entry point, cloned into request handlers, and closed on shutdown.
//! Concurrency control is left to the engine: there is no in-process locking
//! or caching here.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::instrument;

use userbase_core::{User, UserDetails, UserId};

use crate::error::StoreError;
use crate::mapper::{self, USER_COLUMNS, UserRow};
use crate::schema;

#[derive(Debug, Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    /// Wrap an existing pool. The schema must already be applied.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(schema::connect(database_url).await?))
    }

    /// All users, most recently created first.
    #[instrument(skip_all, err)]
    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(mapper::expand).collect())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    pub async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(mapper::expand))
    }

    /// Insert a new user and return the id storage assigned to it.
    #[instrument(skip_all, err)]
    pub async fn create(&self, details: &UserDetails) -> Result<UserId, StoreError> {
        let cols = mapper::flatten(details);
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (
                name,
                email,
                phone,
                company,
                address_street,
                address_city,
                address_zip,
                geo_lat,
                geo_lng,
                created_at,
                updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(cols.name)
        .bind(cols.email)
        .bind(cols.phone)
        .bind(cols.company)
        .bind(cols.address_street)
        .bind(cols.address_city)
        .bind(cols.address_zip)
        .bind(cols.geo_lat)
        .bind(cols.geo_lng)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = UserId::new(result.last_insert_rowid());
        tracing::debug!(user_id = %id, "user created");
        Ok(id)
    }

    /// Replace every field of user `id`. Returns `false` if no such user exists.
    #[instrument(skip(self, details), fields(user_id = %id), err)]
    pub async fn update(&self, id: UserId, details: &UserDetails) -> Result<bool, StoreError> {
        let cols = mapper::flatten(details);

        let result = sqlx::query(
            r#"
            UPDATE users SET
                name = ?,
                email = ?,
                phone = ?,
                company = ?,
                address_street = ?,
                address_city = ?,
                address_zip = ?,
                geo_lat = ?,
                geo_lng = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(cols.name)
        .bind(cols.email)
        .bind(cols.phone)
        .bind(cols.company)
        .bind(cols.address_street)
        .bind(cols.address_city)
        .bind(cols.address_zip)
        .bind(cols.geo_lat)
        .bind(cols.geo_lng)
        .bind(Utc::now())
        .bind(id.get())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete user `id`. Returns `false` if no such user exists.
    #[instrument(skip(self), fields(user_id = %id), err)]
    pub async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Round-trip a trivial query to confirm the database is reachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close every pooled connection. Further calls on any clone will fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use userbase_core::{Address, Geo};

    async fn store() -> UserStore {
        UserStore::connect("sqlite::memory:").await.unwrap()
    }

    fn details(name: &str, email: &str) -> UserDetails {
        UserDetails {
            name: name.to_string(),
            email: email.to_string(),
            phone: "1-770-736-8031".to_string(),
            company: "Romaguera-Crona".to_string(),
            address: Address {
                street: "Kulas Light".to_string(),
                city: "Gwenborough".to_string(),
                zip: "92998-3874".to_string(),
                geo: Geo { lat: -37.3159, lng: 81.1496 },
            },
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let store = store().await;
        let input = details("Leanne", "leanne@example.com");

        let id = store.create(&input).await.unwrap();
        let user = store.get(id).await.unwrap().unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.details, input);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_distinct_error() {
        let store = store().await;
        store.create(&details("A", "same@example.com")).await.unwrap();

        let err = store.create(&details("B", "same@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = store().await;
        for name in ["A", "B", "C"] {
            store
                .create(&details(name, &format!("{}@example.com", name.to_lowercase())))
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.details.name)
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn list_of_empty_table_is_empty() {
        assert!(store().await.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_and_refreshes_timestamp() {
        let store = store().await;
        let id = store.create(&details("Old", "old@example.com")).await.unwrap();
        let before = store.get(id).await.unwrap().unwrap();

        let replacement = details("New", "new@example.com");
        assert!(store.update(id, &replacement).await.unwrap());

        let after = store.get(id).await.unwrap().unwrap();
        assert_eq!(after.details, replacement);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn update_missing_user_touches_nothing() {
        let store = store().await;
        assert!(!store.update(UserId::new(99), &details("X", "x@example.com")).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_into_taken_email_conflicts() {
        let store = store().await;
        store.create(&details("A", "a@example.com")).await.unwrap();
        let b = store.create(&details("B", "b@example.com")).await.unwrap();

        let err = store.update(b, &details("B", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn delete_is_hard_and_reports_absence() {
        let store = store().await;
        let id = store.create(&details("Gone", "gone@example.com")).await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn close_releases_the_pool() {
        let store = store().await;
        store.ping().await.unwrap();
        store.close().await;

        assert!(store.is_closed());
        assert!(store.ping().await.is_err());
    }
}
