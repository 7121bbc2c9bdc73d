pub mod health;
pub mod notification;
pub mod project;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users/register                                  register (public)
/// /users/login                                     login (public)
/// /users                                           list (auth)
/// /users/{id}                                      get (auth)
///
/// /projects                                        list, create (client)
/// /projects/mine                                   caller's projects
/// /projects/mine/summary                           per-status counts
/// /projects/updates                                client update feed
/// /projects/{id}                                   get, edit, delete
/// /projects/{id}/status                            complete or cancel (PUT)
/// /projects/{id}/assign/{freelancer_id}            direct assignment (PUT)
/// /projects/{id}/apply                             submit application (POST)
/// /projects/{id}/applications/{app_id}             accept or reject (PUT)
/// /projects/{id}/update                            post progress (POST)
/// /projects/{id}/updates                           list progress (GET)
///
/// /notifications                                   list
/// /notifications/read-all                          mark all read (POST)
/// /notifications/unread-count                      unread count
/// /notifications/{id}/read                         mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user::router())
        .nest("/projects", project::router())
        .nest("/notifications", notification::router())
}
