// ABOUTME: Per-user recipe collections ("saved" and "pinned") and their database operations
// ABOUTME: Both collections share one row shape and live in separate tables

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// No row with the given id belongs to the user named in the request.
    #[error("Unauthorized to delete")]
    NotOwned,
}

/// Which of the two per-user collections an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Bookmarked recipes
    Saved,
    /// Recipes pinned to the top of the user's board
    Pinned,
}

impl CollectionKind {
    fn table(self) -> &'static str {
        match self {
            CollectionKind::Saved => "saved",
            CollectionKind::Pinned => "pinned",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// A reference to an external recipe kept in one of a user's collections
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeEntry {
    pub id: i64,
    /// Id of the recipe in the upstream recipe catalogue
    pub recipe_id: String,
    pub title: String,
    pub image: String,
    /// Identity id of the owning user
    pub user_id: String,
    pub created_at: DateTime<chrono::Utc>,
}

pub type Saved = RecipeEntry;
pub type Pinned = RecipeEntry;

/// Fields supplied by the client when adding a recipe to a collection
#[derive(Debug, Deserialize, Clone)]
pub struct NewRecipeEntry {
    /// Catalogue ids arrive as either JSON strings or numbers
    #[serde(rename = "id", deserialize_with = "string_or_number")]
    pub recipe_id: String,
    pub title: String,
    pub image: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

const COLUMNS: &str = "id, recipe_id, title, image, user_id, created_at";

impl RecipeEntry {
    /// All entries of `kind` owned by `user_id`, oldest first
    pub async fn list_for_user(
        pool: &SqlitePool,
        kind: CollectionKind,
        user_id: &str,
    ) -> Result<Vec<Self>, CollectionError> {
        let entries = sqlx::query_as::<_, RecipeEntry>(&format!(
            "SELECT {COLUMNS} FROM {} WHERE user_id = ?1 ORDER BY id",
            kind.table()
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    pub async fn create(
        pool: &SqlitePool,
        kind: CollectionKind,
        user_id: &str,
        entry: &NewRecipeEntry,
    ) -> Result<Self, CollectionError> {
        let created = sqlx::query_as::<_, RecipeEntry>(&format!(
            "INSERT INTO {} (recipe_id, title, image, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP)
             RETURNING {COLUMNS}",
            kind.table()
        ))
        .bind(&entry.recipe_id)
        .bind(&entry.title)
        .bind(&entry.image)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(created)
    }

    /// Delete the entry `id` only if it belongs to `user_id`, returning the removed row
    pub async fn delete_owned(
        pool: &SqlitePool,
        kind: CollectionKind,
        id: i64,
        user_id: &str,
    ) -> Result<Self, CollectionError> {
        sqlx::query_as::<_, RecipeEntry>(&format!(
            "DELETE FROM {} WHERE id = ?1 AND user_id = ?2 RETURNING {COLUMNS}",
            kind.table()
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(CollectionError::NotOwned)
    }

    /// Remove every saved and pinned entry of `user_id` in a single transaction.
    /// Returns the number of (saved, pinned) rows deleted.
    pub async fn delete_all_for_user(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<(u64, u64), CollectionError> {
        let mut tx = pool.begin().await?;

        let saved = sqlx::query("DELETE FROM saved WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let pinned = sqlx::query("DELETE FROM pinned WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok((saved, pinned))
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

    fn soup() -> NewRecipeEntry {
        NewRecipeEntry {
            recipe_id: "r1".to_string(),
            title: "Soup".to_string(),
            image: "x.png".to_string(),
        }
    }

    #[test]
    fn test_new_entry_accepts_numeric_recipe_id() {
        let entry: NewRecipeEntry =
            serde_json::from_str(r#"{"id": 716429, "title": "Pasta", "image": "p.jpg"}"#).unwrap();
        assert_eq!(entry.recipe_id, "716429");

        let entry: NewRecipeEntry =
            serde_json::from_str(r#"{"id": "r1", "title": "Soup", "image": "x.png"}"#).unwrap();
        assert_eq!(entry.recipe_id, "r1");
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = RecipeEntry {
            id: 1,
            recipe_id: "r1".to_string(),
            title: "Soup".to_string(),
            image: "x.png".to_string(),
            user_id: "123".to_string(),
            created_at: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["recipeId"], "r1");
        assert_eq!(json["userId"], "123");
        assert!(json.get("recipe_id").is_none());
    }

    #[tokio::test]
    async fn test_collections_are_independent() {
        let pool = setup_pool().await;

        RecipeEntry::create(&pool, CollectionKind::Saved, "123", &soup())
            .await
            .unwrap();

        let saved = RecipeEntry::list_for_user(&pool, CollectionKind::Saved, "123")
            .await
            .unwrap();
        let pinned = RecipeEntry::list_for_user(&pool, CollectionKind::Pinned, "123")
            .await
            .unwrap();

        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].recipe_id, "r1");
        assert_eq!(saved[0].user_id, "123");
        assert!(pinned.is_empty());
    }

    #[tokio::test]
    async fn test_delete_owned_rejects_other_user() {
        let pool = setup_pool().await;
        let entry = RecipeEntry::create(&pool, CollectionKind::Pinned, "alice", &soup())
            .await
            .unwrap();

        let err = RecipeEntry::delete_owned(&pool, CollectionKind::Pinned, entry.id, "mallory")
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::NotOwned));

        let remaining = RecipeEntry::list_for_user(&pool, CollectionKind::Pinned, "alice")
            .await
            .unwrap();
        assert_eq!(remaining, vec![entry.clone()]);

        let deleted = RecipeEntry::delete_owned(&pool, CollectionKind::Pinned, entry.id, "alice")
            .await
            .unwrap();
        assert_eq!(deleted, entry);
    }

    #[tokio::test]
    async fn test_delete_all_for_user_spares_other_users() {
        let pool = setup_pool().await;
        for kind in [CollectionKind::Saved, CollectionKind::Pinned] {
            RecipeEntry::create(&pool, kind, "gone", &soup()).await.unwrap();
            RecipeEntry::create(&pool, kind, "stays", &soup()).await.unwrap();
        }
        RecipeEntry::create(&pool, CollectionKind::Saved, "gone", &soup())
            .await
            .unwrap();

        let (saved, pinned) = RecipeEntry::delete_all_for_user(&pool, "gone").await.unwrap();
        assert_eq!((saved, pinned), (2, 1));

        for kind in [CollectionKind::Saved, CollectionKind::Pinned] {
            assert!(RecipeEntry::list_for_user(&pool, kind, "gone")
                .await
                .unwrap()
                .is_empty());
            assert_eq!(
                RecipeEntry::list_for_user(&pool, kind, "stays")
                    .await
                    .unwrap()
                    .len(),
                1
            );
        }
    }

    #[tokio::test]
    async fn test_delete_all_for_user_rolls_back_when_pinned_delete_fails() {
        let pool = setup_pool().await;
        RecipeEntry::create(&pool, CollectionKind::Saved, "gone", &soup())
            .await
            .unwrap();

        sqlx::query("DROP TABLE pinned").execute(&pool).await.unwrap();

        let err = RecipeEntry::delete_all_for_user(&pool, "gone")
            .await
            .unwrap_err();
        assert!(matches!(err, CollectionError::Database(_)));

        let saved = RecipeEntry::list_for_user(&pool, CollectionKind::Saved, "gone")
            .await
            .unwrap();
        assert_eq!(saved.len(), 1);
    }
}
