// ABOUTME: Identity provider abstraction for account sign-up, sign-in and password management
// ABOUTME: Implemented against Supabase auth in production and by in-memory fakes in tests

pub mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    /// The provider answered and rejected the request
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected identity provider response: {0}")]
    InvalidResponse(String),
}

impl IdentityError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        IdentityError::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Returned when an operation needs a signed-in identity and none is available
    pub fn session_missing() -> Self {
        Self::rejected(401, "Auth session missing!")
    }
}

/// An account as reported by the identity provider.
/// Only `id` is interpreted; everything else is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl IdentityUser {
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            email,
            extra: Map::new(),
        }
    }
}

/// Operations the service needs from the external identity service.
///
/// `access_token` arguments carry the caller's bearer token when the request had one.
/// Without a token there is no signed-in identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an identity. Providers that require email confirmation may not return a user.
    async fn sign_up(&self, email: &str, password: &str)
        -> Result<Option<IdentityUser>, IdentityError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, IdentityError>;

    async fn sign_out(&self, access_token: Option<&str>) -> Result<(), IdentityError>;

    /// Change the password of the signed-in identity, verifying the current one
    async fn change_password(
        &self,
        access_token: Option<&str>,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), IdentityError>;

    /// Send a password reset email whose link lands on `redirect_to`
    async fn send_password_reset(&self, email: &str, redirect_to: &str)
        -> Result<(), IdentityError>;

    async fn update_password(
        &self,
        access_token: Option<&str>,
        new_password: &str,
    ) -> Result<IdentityUser, IdentityError>;

    /// Delete an identity. Requires privileged credentials.
    async fn delete_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError>;
}
