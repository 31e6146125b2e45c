use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("User does not exist")]
    NotFound,
}

/// An application user. Credentials are held by the identity provider, not here.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    /// The date and time the user was created
    pub created_at: DateTime<chrono::Utc>,
    /// The date and time the user was last updated
    pub updated_at: DateTime<chrono::Utc>,
}

impl User {
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Self, UserError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, created_at, updated_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::NotFound)
    }

    /// Insert a user record. No route writes users; this seeds the table for
    /// data loads and tests.
    pub async fn create(pool: &SqlitePool, email: &str) -> Result<Self, UserError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, created_at, updated_at)
             VALUES (?1, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
             RETURNING id, email, created_at, updated_at",
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use std::path::PathBuf;

    async fn setup_pool() -> SqlitePool {
        let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("database/migrations");
        Database::new(PathBuf::from(":memory:"), migrations)
            .await
            .unwrap()
            .pool
    }

    #[tokio::test]
    async fn test_find_by_id_returns_created_user() {
        let pool = setup_pool().await;
        let created = User::create(&pool, "cook@example.com").await.unwrap();

        let found = User::find_by_id(&pool, created.id).await.unwrap();
        assert_eq!(found, created);
        assert_eq!(found.email, "cook@example.com");
    }

    #[tokio::test]
    async fn test_find_by_id_missing_user() {
        let pool = setup_pool().await;

        let err = User::find_by_id(&pool, 42).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound));
        assert_eq!(err.to_string(), "User does not exist");
    }
}
