use axum::{http::StatusCode, routing::get, Router};

use crate::api::http::users;
use crate::state::SharedState;

/// Build routes with explicit state
pub fn routes(state: SharedState) -> Router {
    tracing::debug!("Building routes");

    Router::new()
        .route("/health", get(health_check))
        .nest("/users", users::routes())
        .with_state(state)
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}
