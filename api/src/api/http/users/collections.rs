// ABOUTME: Saved and pinned recipe endpoints for a user
// ABOUTME: Both collections share these helpers; the handlers only pick the collection

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::state::SharedState;
use recipebook_core::types::{CollectionKind, NewRecipeEntry, Pinned, RecipeEntry, Saved};

/// Body of a collection delete: the entry id, not the recipe id
#[derive(Debug, Deserialize)]
pub struct RemoveEntryRequest {
    pub id: i64,
}

// The path user id is trusted as-is; callers are not checked against it.

async fn list(
    state: &SharedState,
    kind: CollectionKind,
    user_id: &str,
) -> Result<Json<Vec<RecipeEntry>>, ApiError> {
    let entries = RecipeEntry::list_for_user(&state.db, kind, user_id).await?;
    tracing::debug!("Found {} {} recipes for user {}", entries.len(), kind, user_id);
    Ok(Json(entries))
}

async fn add(
    state: &SharedState,
    kind: CollectionKind,
    user_id: &str,
    entry: NewRecipeEntry,
) -> Result<Json<RecipeEntry>, ApiError> {
    let created = RecipeEntry::create(&state.db, kind, user_id, &entry).await?;
    tracing::info!(
        "User {} added recipe {} to {}",
        user_id,
        created.recipe_id,
        kind
    );
    Ok(Json(created))
}

async fn remove(
    state: &SharedState,
    kind: CollectionKind,
    user_id: &str,
    id: i64,
) -> Result<Json<RecipeEntry>, ApiError> {
    let deleted = RecipeEntry::delete_owned(&state.db, kind, id, user_id)
        .await
        .map_err(|e| {
            tracing::warn!("User {} could not delete {} entry {}: {}", user_id, kind, id, e);
            ApiError::from(e)
        })?;
    Ok(Json(deleted))
}

/// GET /users/:id/saved
pub async fn list_saved(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Saved>>, ApiError> {
    list(&state, CollectionKind::Saved, &user_id).await
}

/// POST /users/:id/saved
pub async fn add_saved(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(entry): Json<NewRecipeEntry>,
) -> Result<Json<Saved>, ApiError> {
    add(&state, CollectionKind::Saved, &user_id, entry).await
}

/// DELETE /users/:id/saved
pub async fn remove_saved(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(req): Json<RemoveEntryRequest>,
) -> Result<Json<Saved>, ApiError> {
    remove(&state, CollectionKind::Saved, &user_id, req.id).await
}

/// GET /users/:id/pinned
pub async fn list_pinned(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Pinned>>, ApiError> {
    list(&state, CollectionKind::Pinned, &user_id).await
}

/// POST /users/:id/pinned
pub async fn add_pinned(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(entry): Json<NewRecipeEntry>,
) -> Result<Json<Pinned>, ApiError> {
    add(&state, CollectionKind::Pinned, &user_id, entry).await
}

/// DELETE /users/:id/pinned
pub async fn remove_pinned(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Json(req): Json<RemoveEntryRequest>,
) -> Result<Json<Pinned>, ApiError> {
    remove(&state, CollectionKind::Pinned, &user_id, req.id).await
}
