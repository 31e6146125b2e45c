// ABOUTME: Supabase auth (GoTrue) and PostgREST client implementing IdentityProvider
// ABOUTME: Uses the anon key for end-user calls and the service role key for admin deletion

use super::{IdentityError, IdentityProvider, IdentityUser};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};

/// Keys checked, in order, for a human readable message in an error body
const ERROR_MESSAGE_KEYS: [&str; 4] = ["msg", "message", "error_description", "error"];

#[derive(Debug, Deserialize)]
struct TokenResponse {
    user: IdentityUser,
}

pub struct SupabaseIdentityProvider {
    base_url: String,
    anon_key: String,
    service_role_key: String,
    client: Client,
}

impl SupabaseIdentityProvider {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Supabase identity provider configured for {}", base_url);

        Self {
            base_url,
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
            client: Client::new(),
        }
    }

    fn request(&self, method: Method, path: &str, api_key: &str, bearer: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", api_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, IdentityError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(status = %status, message = %message, "Identity provider rejected request");

        Err(IdentityError::rejected(status.as_u16(), message))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, IdentityError> {
        response
            .json::<T>()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))
    }
}

/// Pull the provider's message out of an error body, falling back to the status text
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|json| {
            ERROR_MESSAGE_KEYS
                .iter()
                .find_map(|key| json.get(*key).and_then(JsonValue::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Identity provider error")
                .to_string()
        })
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<IdentityUser>, IdentityError> {
        debug!("Signing up {}", email);

        let response = self
            .send(
                self.request(Method::POST, "/auth/v1/signup", &self.anon_key, &self.anon_key)
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        let body: JsonValue = Self::read_json(response).await?;

        // With auto-confirm the body is a session wrapping the user,
        // otherwise it is the bare, unconfirmed user.
        let user = if body.get("user").is_some_and(JsonValue::is_object) {
            body.get("user").cloned()
        } else if body.get("id").is_some() {
            Some(body)
        } else {
            None
        };

        user.map(serde_json::from_value)
            .transpose()
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, IdentityError> {
        debug!("Password sign-in for {}", email);

        let response = self
            .send(
                self.request(
                    Method::POST,
                    "/auth/v1/token?grant_type=password",
                    &self.anon_key,
                    &self.anon_key,
                )
                .json(&json!({ "email": email, "password": password })),
            )
            .await?;
        let token: TokenResponse = Self::read_json(response).await?;

        Ok(token.user)
    }

    async fn sign_out(&self, access_token: Option<&str>) -> Result<(), IdentityError> {
        let Some(token) = access_token else {
            debug!("Sign-out requested without a session");
            return Ok(());
        };

        match self
            .send(self.request(Method::POST, "/auth/v1/logout", &self.anon_key, token))
            .await
        {
            Ok(_) => Ok(()),
            // The session is already gone on the provider side
            Err(IdentityError::Rejected {
                status: 401 | 403 | 404,
                ..
            }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn change_password(
        &self,
        access_token: Option<&str>,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        let token = access_token.ok_or_else(IdentityError::session_missing)?;

        self.send(
            self.request(
                Method::POST,
                "/rest/v1/rpc/change_user_password",
                &self.anon_key,
                token,
            )
            .json(&json!({
                "current_plain_password": current_password,
                "new_plain_password": new_password,
            })),
        )
        .await?;

        Ok(())
    }

    async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError> {
        let path = format!(
            "/auth/v1/recover?redirect_to={}",
            urlencoding::encode(redirect_to)
        );

        self.send(
            self.request(Method::POST, &path, &self.anon_key, &self.anon_key)
                .json(&json!({ "email": email })),
        )
        .await?;

        debug!("Password reset email requested for {}", email);
        Ok(())
    }

    async fn update_password(
        &self,
        access_token: Option<&str>,
        new_password: &str,
    ) -> Result<IdentityUser, IdentityError> {
        let token = access_token.ok_or_else(IdentityError::session_missing)?;

        let response = self
            .send(
                self.request(Method::PUT, "/auth/v1/user", &self.anon_key, token)
                    .json(&json!({ "password": new_password })),
            )
            .await?;

        Self::read_json(response).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError> {
        let path = format!("/auth/v1/admin/users/{}", urlencoding::encode(user_id));

        let response = self
            .send(
                self.request(
                    Method::DELETE,
                    &path,
                    &self.service_role_key,
                    &self.service_role_key,
                )
                .json(&json!({ "should_soft_delete": false })),
            )
            .await?;

        info!("Deleted identity {}", user_id);
        Self::read_json(response).await
    }
}
