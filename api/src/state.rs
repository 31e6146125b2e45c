use recipebook_core::identity::IdentityProvider;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Collaborators shared by every handler, built once at startup and handed to the router
pub struct RecipebookState {
    pub db: SqlitePool,
    pub identity: Arc<dyn IdentityProvider>,
    /// Where password reset emails send the user
    pub reset_redirect_url: String,
}

pub type SharedState = Arc<RecipebookState>;
