//! Project lifecycle engine.
//!
//! [`ProjectEngine`] drives every project operation. Mutations follow one
//! pattern: lock the project row, judge the intent with a pure rule from
//! `gighub_core`, apply the resulting [`ProjectChange`], reload, commit, and
//! only then publish an event. Each project is its own consistency
//! boundary; operations on different projects never wait on each other.

mod events;

use std::sync::Arc;

use chrono::Utc;
use gighub_core::application::{submit_application, ApplyRequest};
use gighub_core::caller::Caller;
use gighub_core::error::CoreError;
use gighub_core::ledger::{
    ensure_can_view_feed, ensure_can_view_updates, post_update, updates_newest_first,
    PostUpdateRequest, ProjectUpdateEntry,
};
use gighub_core::lifecycle::{
    assign_freelancer, change_status, create_project, decide_application, edit_details,
    ensure_deletable, CreateProjectRequest, ProjectChange, UpdateProjectRequest,
};
use gighub_core::project::{ProgressUpdate, Project, StatusSummary};
use gighub_core::roles::Role;
use gighub_core::status::{ApplicationStatus, ProjectStatus};
use gighub_core::types::DbId;
use gighub_core::visibility::visible_to;
use gighub_db::models::project::{Participant, ProjectFilter};
use gighub_db::repositories::{ProjectRepo, UserRepo};
use gighub_db::DbPool;
use gighub_events::EventBus;

use crate::error::{AppError, AppResult};

/// Executes project operations on behalf of an authenticated [`Caller`].
#[derive(Clone)]
pub struct ProjectEngine {
    pool: DbPool,
    event_bus: Arc<EventBus>,
}

impl ProjectEngine {
    pub fn new(pool: DbPool, event_bus: Arc<EventBus>) -> Self {
        Self { pool, event_bus }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Create an open project owned by `caller`.
    pub async fn create(&self, caller: &Caller, input: CreateProjectRequest) -> AppResult<Project> {
        let new_project = create_project(caller, input, Utc::now())?;
        let project = ProjectRepo::create(&self.pool, &new_project).await?;
        tracing::info!(
            project_id = project.id,
            client_id = caller.user_id,
            questions = project.questions.len(),
            "Project created"
        );
        Ok(project)
    }

    /// Bind `freelancer_id` to the project and move it to `in_progress`.
    pub async fn assign(
        &self,
        caller: &Caller,
        project_id: DbId,
        freelancer_id: DbId,
    ) -> AppResult<Project> {
        let freelancer_role = UserRepo::find_by_id(&self.pool, freelancer_id)
            .await?
            .and_then(|user| user.role());
        self.mutate(caller, project_id, |project| {
            assign_freelancer(project, caller, freelancer_id, freelancer_role)
        })
        .await
    }

    /// Accept or reject one of the project's applications.
    pub async fn decide(
        &self,
        caller: &Caller,
        project_id: DbId,
        application_id: DbId,
        decision: ApplicationStatus,
    ) -> AppResult<Project> {
        self.mutate(caller, project_id, |project| {
            decide_application(project, caller, application_id, decision)
        })
        .await
    }

    /// Edit the project's client-editable fields.
    pub async fn edit(
        &self,
        caller: &Caller,
        project_id: DbId,
        input: UpdateProjectRequest,
    ) -> AppResult<Project> {
        let now = Utc::now();
        self.mutate(caller, project_id, |project| {
            edit_details(project, caller, input, now)
        })
        .await
    }

    /// Complete or cancel the project.
    pub async fn change_status(
        &self,
        caller: &Caller,
        project_id: DbId,
        target: ProjectStatus,
    ) -> AppResult<Project> {
        self.mutate(caller, project_id, |project| {
            change_status(project, caller, target)
        })
        .await
    }

    /// Soft-delete the project.
    pub async fn delete(&self, caller: &Caller, project_id: DbId) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let project = ProjectRepo::lock_for_update(&mut tx, project_id)
            .await?
            .ok_or(AppError::not_found("Project", project_id))?;
        ensure_deletable(&project, caller)?;
        ProjectRepo::soft_delete(&mut tx, project_id).await?;
        tx.commit().await?;
        tracing::info!(project_id, client_id = caller.user_id, "Project deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Applications and updates
    // -----------------------------------------------------------------------

    /// Submit `caller`'s application to the project.
    pub async fn apply(
        &self,
        caller: &Caller,
        project_id: DbId,
        input: ApplyRequest,
    ) -> AppResult<Project> {
        self.mutate(caller, project_id, |project| {
            submit_application(project, caller, input)
        })
        .await
    }

    /// Append a progress update from the assigned freelancer.
    pub async fn post_update(
        &self,
        caller: &Caller,
        project_id: DbId,
        input: PostUpdateRequest,
    ) -> AppResult<Project> {
        self.mutate(caller, project_id, |project| {
            post_update(project, caller, input)
        })
        .await
    }

    /// The project's updates, newest first.
    pub async fn list_updates(
        &self,
        caller: &Caller,
        project_id: DbId,
    ) -> AppResult<Vec<ProgressUpdate>> {
        let project = self.load(project_id).await?;
        ensure_can_view_updates(&project, caller)?;
        Ok(updates_newest_first(&project))
    }

    /// Updates across every project the calling client owns, newest first.
    pub async fn update_feed(&self, caller: &Caller) -> AppResult<Vec<ProjectUpdateEntry>> {
        ensure_can_view_feed(caller)?;
        Ok(ProjectRepo::list_updates_for_client(&self.pool, caller.user_id).await?)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The project as `caller` may see it.
    pub async fn get(&self, caller: &Caller, project_id: DbId) -> AppResult<Project> {
        let project = self.load(project_id).await?;
        Ok(visible_to(project, caller))
    }

    pub async fn list(&self, caller: &Caller, filter: &ProjectFilter) -> AppResult<Vec<Project>> {
        let projects = ProjectRepo::list(&self.pool, filter).await?;
        Ok(projects.into_iter().map(|p| visible_to(p, caller)).collect())
    }

    /// Projects the caller owns (client) or is assigned to (freelancer).
    pub async fn mine(&self, caller: &Caller) -> AppResult<Vec<Project>> {
        let projects =
            ProjectRepo::list_for_participant(&self.pool, participant(caller), caller.user_id)
                .await?;
        Ok(projects.into_iter().map(|p| visible_to(p, caller)).collect())
    }

    /// Per-status counts over [`ProjectEngine::mine`].
    pub async fn summary(&self, caller: &Caller) -> AppResult<StatusSummary> {
        let counts =
            ProjectRepo::status_counts(&self.pool, participant(caller), caller.user_id).await?;
        let mut resolved = Vec::with_capacity(counts.len());
        for (status_id, count) in counts {
            let status = ProjectStatus::from_id(status_id).ok_or_else(|| {
                CoreError::Internal(format!("Unknown project status id {status_id}"))
            })?;
            resolved.push((status, count));
        }
        Ok(StatusSummary::from_counts(resolved))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// The full aggregate, unfiltered.
    async fn load(&self, project_id: DbId) -> AppResult<Project> {
        ProjectRepo::find_by_id(&self.pool, project_id)
            .await?
            .ok_or(AppError::not_found("Project", project_id))
    }

    /// Run one read-modify-write of a project aggregate.
    ///
    /// `decide` sees the state committed by every earlier writer, because the
    /// row lock is taken before the project is read.
    async fn mutate<F>(&self, caller: &Caller, project_id: DbId, decide: F) -> AppResult<Project>
    where
        F: FnOnce(&Project) -> Result<ProjectChange, CoreError>,
    {
        let mut tx = self.pool.begin().await?;

        let before = ProjectRepo::lock_for_update(&mut tx, project_id)
            .await?
            .ok_or(AppError::not_found("Project", project_id))?;

        let change = match decide(&before) {
            Ok(change) => change,
            Err(err) => {
                tracing::debug!(project_id, user_id = caller.user_id, error = %err, "Change refused");
                return Err(err.into());
            }
        };

        ProjectRepo::apply_change(&mut tx, project_id, &change).await?;

        // Lock already held; this only re-reads.
        let after = ProjectRepo::lock_for_update(&mut tx, project_id)
            .await?
            .ok_or(AppError::not_found("Project", project_id))?;

        if !after.freelancer_binding_is_consistent() {
            return Err(AppError::Core(CoreError::Internal(format!(
                "Project {project_id} would be {} with freelancer {:?}",
                after.status, after.freelancer_id
            ))));
        }

        tx.commit().await?;

        tracing::info!(
            project_id,
            user_id = caller.user_id,
            change = change.name(),
            status = %after.status,
            version = after.version,
            "Project updated"
        );

        if let Some(event) = events::event_for(&before, &after, caller, &change) {
            self.event_bus.publish(event);
        }

        Ok(visible_to(after, caller))
    }
}

fn participant(caller: &Caller) -> Participant {
    match caller.role {
        Role::Client => Participant::Client,
        Role::Freelancer => Participant::Freelancer,
    }
}
