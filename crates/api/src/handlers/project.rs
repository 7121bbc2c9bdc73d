//! Handlers for the `/projects` resource.
//!
//! Handlers only translate HTTP into engine calls; every rule lives in
//! [`ProjectEngine`](crate::engine::ProjectEngine).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gighub_core::application::ApplyRequest;
use gighub_core::ledger::{PostUpdateRequest, ProjectUpdateEntry};
use gighub_core::lifecycle::{CreateProjectRequest, UpdateProjectRequest};
use gighub_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use gighub_core::project::{ProgressUpdate, Project, StatusSummary};
use gighub_core::status::{ApplicationStatus, ProjectStatus};
use gighub_core::types::DbId;
use gighub_db::models::project::ProjectFilter;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireClient, RequireFreelancer};
use crate::query::ProjectListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /projects/{id}/applications/{app_id}` and
/// `PUT /projects/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
pub async fn create_project(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<impl IntoResponse> {
    let project = state.engine().create(&user.caller(), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects
///
/// Newest first, optionally filtered by `status` and `category`. Each
/// project is trimmed to what the caller may see.
pub async fn list_projects(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<ProjectStatus>)
        .transpose()?;
    let filter = ProjectFilter {
        status,
        category: params.category.filter(|c| !c.trim().is_empty()),
        limit: clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT),
        offset: clamp_offset(params.offset),
    };
    let projects = state.engine().list(&user.caller(), &filter).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.engine().get(&user.caller(), id).await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}
pub async fn update_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.engine().edit(&user.caller(), id, input).await?;
    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
///
/// Soft-deletes the project. Returns 204 No Content.
pub async fn delete_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.engine().delete(&user.caller(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Caller-scoped views
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/mine
pub async fn my_projects(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.engine().mine(&user.caller()).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/mine/summary
pub async fn my_summary(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<StatusSummary>>> {
    let summary = state.engine().summary(&user.caller()).await?;
    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// PUT /api/v1/projects/{id}/assign/{freelancer_id}
pub async fn assign_freelancer(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, freelancer_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .engine()
        .assign(&user.caller(), id, freelancer_id)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/v1/projects/{id}/status
///
/// Body: `{ "status": "completed" | "cancelled" }`.
pub async fn change_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<StatusBody>,
) -> AppResult<Json<DataResponse<Project>>> {
    let target: ProjectStatus = body.status.parse()?;
    let project = state
        .engine()
        .change_status(&user.caller(), id, target)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/apply
pub async fn apply(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ApplyRequest>,
) -> AppResult<impl IntoResponse> {
    let project = state.engine().apply(&user.caller(), id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// PUT /api/v1/projects/{id}/applications/{app_id}
///
/// Body: `{ "status": "accepted" | "rejected" }`.
pub async fn decide_application(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, application_id)): Path<(DbId, DbId)>,
    Json(body): Json<StatusBody>,
) -> AppResult<Json<DataResponse<Project>>> {
    let decision: ApplicationStatus = body.status.parse()?;
    let project = state
        .engine()
        .decide(&user.caller(), id, application_id, decision)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Progress updates
// ---------------------------------------------------------------------------

/// POST /api/v1/projects/{id}/update
pub async fn post_update(
    RequireFreelancer(user): RequireFreelancer,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PostUpdateRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.engine().post_update(&user.caller(), id, input).await?;
    Ok(Json(DataResponse { data: project }))
}

/// GET /api/v1/projects/{id}/updates
pub async fn list_updates(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProgressUpdate>>>> {
    let updates = state.engine().list_updates(&user.caller(), id).await?;
    Ok(Json(DataResponse { data: updates }))
}

/// GET /api/v1/projects/updates
///
/// Every update across the calling client's projects.
pub async fn update_feed(
    RequireClient(user): RequireClient,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProjectUpdateEntry>>>> {
    let feed = state.engine().update_feed(&user.caller()).await?;
    Ok(Json(DataResponse { data: feed }))
}
