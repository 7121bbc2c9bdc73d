//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST   /register          -> register (public)
/// POST   /login             -> login (public)
/// GET    /                  -> list_users
/// GET    /{id}              -> get_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .route("/", get(user::list_users))
        .route("/{id}", get(user::get_user))
}
