// ABOUTME: Account authentication handlers backed by the external identity provider
// ABOUTME: Registration, login/logout and the password change and reset flows

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    Json,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::api::error::ApiError;
use crate::state::SharedState;
use recipebook_core::identity::IdentityUser;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResetRequest {
    pub new_password: String,
}

/// Identity payload wrapper returned by the account update and delete routes
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityPayload {
    pub user: IdentityUser,
}

/// Bearer token from the Authorization header, if the caller sent one
pub struct AccessToken(pub Option<String>);

impl AccessToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);

        Ok(AccessToken(token))
    }
}

/// POST /users
/// Create an identity, responding with its id only
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<Option<String>>, ApiError> {
    tracing::info!("Registering new user with email: {}", req.email);

    let user = state.identity.sign_up(&req.email, &req.password).await?;

    Ok(Json(user.map(|user| user.id)))
}

/// POST /users/login
pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<String>, ApiError> {
    tracing::info!("Login attempt for email: {}", req.email);

    let user = state
        .identity
        .sign_in_with_password(&req.email, &req.password)
        .await?;

    tracing::info!("Successfully logged in user: {}", user.id);
    Ok(Json(user.id))
}

/// POST /users/logout
pub async fn logout(
    State(state): State<SharedState>,
    token: AccessToken,
) -> Result<Json<&'static str>, ApiError> {
    state.identity.sign_out(token.as_deref()).await?;
    Ok(Json("user signed out"))
}

/// PUT /users/password
pub async fn change_password(
    State(state): State<SharedState>,
    token: AccessToken,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<&'static str>, ApiError> {
    state
        .identity
        .change_password(token.as_deref(), &req.password, &req.new_password)
        .await?;

    Ok(Json("password changed"))
}

/// POST /users/reset-password
/// Sends the reset email; the link lands on the configured redirect
pub async fn request_password_reset(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<&'static str>, ApiError> {
    state
        .identity
        .send_password_reset(&req.email, &state.reset_redirect_url)
        .await
        .map_err(|e| {
            tracing::error!("Password reset email failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json("Password email sent"))
}

/// PUT /users/reset-password
/// Sets a new password for the signed-in identity
pub async fn apply_password_reset(
    State(state): State<SharedState>,
    token: AccessToken,
    Json(req): Json<ApplyResetRequest>,
) -> Result<Json<IdentityPayload>, ApiError> {
    let user = state
        .identity
        .update_password(token.as_deref(), &req.new_password)
        .await
        .map_err(|e| {
            tracing::error!("Password update failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(IdentityPayload { user }))
}
