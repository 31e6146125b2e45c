// ABOUTME: User account and recipe collection endpoints, mounted under /users
// ABOUTME: Account auth flows come from the auth module; records from account and collections

pub mod account;
pub mod collections;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::api::http::auth;
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/password", put(auth::change_password))
        .route(
            "/reset-password",
            post(auth::request_password_reset).put(auth::apply_password_reset),
        )
        .route("/:id", get(account::get_user).delete(account::delete_user))
        .route(
            "/:id/saved",
            get(collections::list_saved)
                .post(collections::add_saved)
                .delete(collections::remove_saved),
        )
        .route(
            "/:id/pinned",
            get(collections::list_pinned)
                .post(collections::add_pinned)
                .delete(collections::remove_pinned),
        )
}
