use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::db::{PgStore, StoreError};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;
    /// Bumps the failed-attempt counter and returns its new value.
    async fn record_failed_login(&self, username: &str) -> Result<i32, StoreError>;
    /// Clears the counter and stamps `last_login`, returning the stamp.
    async fn record_successful_login(&self, username: &str)
        -> Result<OffsetDateTime, StoreError>;
}

#[async_trait]
impl UserRepo for PgStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING user_id, username, password_hash, login_attempts, last_login, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password_hash, login_attempts, last_login, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password_hash, login_attempts, last_login, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn record_failed_login(&self, username: &str) -> Result<i32, StoreError> {
        let (attempts,): (i32,) = sqlx::query_as(
            r#"
            UPDATE users
               SET login_attempts = login_attempts + 1
             WHERE username = $1
            RETURNING login_attempts
            "#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn record_successful_login(
        &self,
        username: &str,
    ) -> Result<OffsetDateTime, StoreError> {
        let (last_login,): (OffsetDateTime,) = sqlx::query_as(
            r#"
            UPDATE users
               SET login_attempts = 0, last_login = now()
             WHERE username = $1
            RETURNING last_login
            "#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(last_login)
    }
}
