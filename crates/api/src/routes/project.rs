//! Route definitions for the `/projects` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                 -> list_projects
/// POST   /                                 -> create_project (client)
/// GET    /mine                             -> my_projects
/// GET    /mine/summary                     -> my_summary
/// GET    /updates                          -> update_feed (client)
///
/// GET    /{id}                             -> get_project
/// PUT    /{id}                             -> update_project
/// DELETE /{id}                             -> delete_project
/// PUT    /{id}/status                      -> change_status
/// PUT    /{id}/assign/{freelancer_id}      -> assign_freelancer
///
/// POST   /{id}/apply                       -> apply
/// PUT    /{id}/applications/{app_id}       -> decide_application
///
/// POST   /{id}/update                      -> post_update
/// GET    /{id}/updates                     -> list_updates
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(project::list_projects).post(project::create_project),
        )
        // Static segments take precedence over /{id}.
        .route("/mine", get(project::my_projects))
        .route("/mine/summary", get(project::my_summary))
        .route("/updates", get(project::update_feed))
        .route(
            "/{id}",
            get(project::get_project)
                .put(project::update_project)
                .delete(project::delete_project),
        )
        .route("/{id}/status", put(project::change_status))
        .route(
            "/{id}/assign/{freelancer_id}",
            put(project::assign_freelancer),
        )
        .route("/{id}/apply", post(project::apply))
        .route(
            "/{id}/applications/{app_id}",
            put(project::decide_application),
        )
        .route("/{id}/update", post(project::post_update))
        .route("/{id}/updates", get(project::list_updates))
}
