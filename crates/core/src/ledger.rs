//! Progress update ledger.
//!
//! Updates are append-only: once written they are never edited or removed.
//! Every listing is ordered newest first (`created_at` descending, then id
//! descending for entries written in the same instant).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::caller::Caller;
use crate::error::CoreError;
use crate::lifecycle::{NewUpdate, ProjectChange};
use crate::project::{ProgressUpdate, Project};
use crate::roles::Role;
use crate::status::ProjectStatus;
use crate::types::DbId;

pub const MIN_PROGRESS: i32 = 0;
pub const MAX_PROGRESS: i32 = 100;

/// Request body for `POST /projects/{id}/update`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostUpdateRequest {
    pub progress: i32,
    pub note: String,
}

/// A progress update annotated with the project it belongs to, for the
/// client's cross-project feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectUpdateEntry {
    pub project_id: DbId,
    pub project_title: String,
    #[serde(flatten)]
    pub update: ProgressUpdate,
}

/// Judge a progress update posted by `caller`.
///
/// Only the currently assigned freelancer may post, and only while the
/// project is in progress.
pub fn post_update(
    project: &Project,
    caller: &Caller,
    input: PostUpdateRequest,
) -> Result<ProjectChange, CoreError> {
    if !project.is_assignee(caller.user_id) {
        return Err(CoreError::Forbidden(format!(
            "Only the freelancer assigned to project {} can post updates",
            project.id
        )));
    }

    if !(MIN_PROGRESS..=MAX_PROGRESS).contains(&input.progress) {
        return Err(CoreError::Validation(format!(
            "progress must be between {MIN_PROGRESS} and {MAX_PROGRESS}, got {}",
            input.progress
        )));
    }

    let note = input.note.trim();
    if note.is_empty() {
        return Err(CoreError::Validation("note is required".into()));
    }

    if project.status != ProjectStatus::InProgress {
        return Err(CoreError::InvalidState(format!(
            "Project {} is {}; updates can only be posted while it is in progress",
            project.id, project.status
        )));
    }

    Ok(ProjectChange::PostUpdate(NewUpdate {
        freelancer_id: caller.user_id,
        progress: input.progress as i16,
        note: note.to_string(),
    }))
}

/// Only the project's client and its assigned freelancer may read updates.
pub fn ensure_can_view_updates(project: &Project, caller: &Caller) -> Result<(), CoreError> {
    if project.is_client(caller.user_id) || project.is_assignee(caller.user_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Only the client or assigned freelancer can view updates for project {}",
            project.id
        )))
    }
}

/// Only clients have a cross-project update feed.
pub fn ensure_can_view_feed(caller: &Caller) -> Result<(), CoreError> {
    caller.require_role(Role::Client, "view the update feed")
}

/// Ordering used for every update listing.
pub fn newest_first(a: &ProgressUpdate, b: &ProgressUpdate) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// The project's updates, newest first.
pub fn updates_newest_first(project: &Project) -> Vec<ProgressUpdate> {
    let mut updates = project.updates.clone();
    updates.sort_by(newest_first);
    updates
}
