// ABOUTME: User record lookup and account deletion
// ABOUTME: Deletion removes the identity first, then the user's saved and pinned recipes

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::http::auth::IdentityPayload;
use crate::api::error::ApiError;
use crate::state::SharedState;
use recipebook_core::types::{RecipeEntry, User};

/// GET /users/:id
pub async fn get_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid user id: {}", id)))?;

    let user = User::find_by_id(&state.db, id).await?;
    Ok(Json(user))
}

/// DELETE /users/:id
pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<IdentityPayload>, ApiError> {
    let user = state.identity.delete_user(&id).await?;

    // The identity is already gone at this point; a failure here leaves orphaned rows behind.
    let (saved, pinned) = RecipeEntry::delete_all_for_user(&state.db, &id)
        .await
        .map_err(|e| {
            tracing::error!("Identity {} deleted but collection cleanup failed: {}", id, e);
            ApiError::from(e)
        })?;

    tracing::info!(
        "Deleted user {} with {} saved and {} pinned recipes",
        id,
        saved,
        pinned
    );

    Ok(Json(IdentityPayload { user }))
}
