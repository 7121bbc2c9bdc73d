//! Project lifecycle rules.
//!
//! Every mutating operation is split in two: a pure decision function here
//! that judges the intent against the current aggregate and the caller, and
//! the persistence step that applies the returned [`ProjectChange`] inside
//! the aggregate's transaction.
//!
//! ```text
//! open --(assign | accept)--> in_progress --(complete)--> completed
//!   \                              \
//!    `------(cancel)----------------`--(cancel)--> cancelled
//! ```
//!
//! Nothing ever moves a project back to `open`.

use serde::Deserialize;

use crate::caller::Caller;
use crate::error::CoreError;
use crate::project::{Answer, Project};
use crate::roles::Role;
use crate::status::{ApplicationStatus, ProjectStatus};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Changes
// ---------------------------------------------------------------------------

/// A validated mutation of one project aggregate.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectChange {
    /// Bind a freelancer and move to `in_progress`.
    Assign { freelancer_id: DbId },
    /// Append a pending application.
    SubmitApplication(NewApplication),
    /// Set an application's status. When `assign_to` is set the project is
    /// bound to that freelancer and moved to `in_progress` in the same write.
    DecideApplication {
        application_id: DbId,
        decision: ApplicationStatus,
        assign_to: Option<DbId>,
    },
    /// Append a progress entry.
    PostUpdate(NewUpdate),
    /// Replace the editable project fields.
    EditDetails(ProjectDetails),
    /// Move to `completed` or `cancelled`.
    ChangeStatus { status: ProjectStatus },
}

impl ProjectChange {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ProjectChange::Assign { .. } => "assign",
            ProjectChange::SubmitApplication(_) => "submit_application",
            ProjectChange::DecideApplication { .. } => "decide_application",
            ProjectChange::PostUpdate(_) => "post_update",
            ProjectChange::EditDetails(_) => "edit_details",
            ProjectChange::ChangeStatus { .. } => "change_status",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub freelancer_id: DbId,
    pub answers: Vec<Answer>,
    pub resume_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUpdate {
    pub freelancer_id: DbId,
    pub progress: i16,
    pub note: String,
}

/// The client-editable fields of a project, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDetails {
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub deadline: Timestamp,
    pub category: Option<String>,
    pub image_ref: Option<String>,
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Request body for creating a project. Required fields are optional here
/// so that a missing field is reported as a validation error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub deadline: Option<Timestamp>,
    pub category: Option<String>,
    pub image_ref: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
}

/// A validated project ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub client_id: DbId,
    pub details: ProjectDetails,
    pub questions: Vec<String>,
}

/// Validate a create request on behalf of `caller`.
///
/// Only clients may post projects. Title and description must be non-blank,
/// the budget positive and finite, and the deadline after `now`. Blank
/// questions are skipped.
pub fn create_project(
    caller: &Caller,
    input: CreateProjectRequest,
    now: Timestamp,
) -> Result<NewProject, CoreError> {
    caller.require_role(Role::Client, "post projects")?;

    let title = required_text(input.title, "title")?;
    let description = required_text(input.description, "description")?;
    let budget = input
        .budget
        .ok_or_else(|| CoreError::Validation("budget is required".into()))?;
    validate_budget(budget)?;
    let deadline = input
        .deadline
        .ok_or_else(|| CoreError::Validation("deadline is required".into()))?;
    validate_deadline(deadline, now)?;

    // Blank questions are dropped; the rest keep their relative order.
    let questions: Vec<String> = input
        .questions
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect();

    Ok(NewProject {
        client_id: caller.user_id,
        details: ProjectDetails {
            title,
            description,
            budget,
            deadline,
            category: optional_text(input.category),
            image_ref: optional_text(input.image_ref),
        },
        questions,
    })
}

// ---------------------------------------------------------------------------
// Assignment and decisions
// ---------------------------------------------------------------------------

/// Directly bind a freelancer to the project.
///
/// `freelancer_role` is the target user's role, or `None` when no such user
/// exists. Re-assignment while `in_progress` is allowed; terminal projects
/// cannot be assigned.
pub fn assign_freelancer(
    project: &Project,
    caller: &Caller,
    freelancer_id: DbId,
    freelancer_role: Option<Role>,
) -> Result<ProjectChange, CoreError> {
    ensure_owner(project, caller, "assign freelancers")?;

    match freelancer_role {
        None => {
            return Err(CoreError::NotFound {
                entity: "User",
                id: freelancer_id,
            })
        }
        Some(Role::Freelancer) => {}
        Some(role) => {
            return Err(CoreError::Validation(format!(
                "User {freelancer_id} is a {role}, not a freelancer"
            )))
        }
    }

    if project.status.is_terminal() {
        return Err(CoreError::InvalidState(format!(
            "Project {} is {}; freelancers can no longer be assigned",
            project.id, project.status
        )));
    }

    Ok(ProjectChange::Assign { freelancer_id })
}

/// Accept or reject one of the project's applications.
///
/// Only pending applications can be decided. Accepting additionally requires
/// the project to still be `open`, so at most one application is ever
/// accepted. Sibling applications are left untouched.
pub fn decide_application(
    project: &Project,
    caller: &Caller,
    application_id: DbId,
    decision: ApplicationStatus,
) -> Result<ProjectChange, CoreError> {
    ensure_owner(project, caller, "review applications")?;

    if !decision.is_decision() {
        return Err(CoreError::Validation(
            "status must be 'accepted' or 'rejected'".into(),
        ));
    }

    let application = project
        .find_application(application_id)
        .ok_or(CoreError::NotFound {
            entity: "Application",
            id: application_id,
        })?;

    if application.status != ApplicationStatus::Pending {
        return Err(CoreError::InvalidState(format!(
            "Application {application_id} has already been {}",
            application.status
        )));
    }

    let assign_to = if decision == ApplicationStatus::Accepted {
        if project.status != ProjectStatus::Open {
            return Err(CoreError::InvalidState(format!(
                "Project {} is {}; applications can only be accepted while it is open",
                project.id, project.status
            )));
        }
        if let Some(accepted) = project.accepted_application() {
            return Err(CoreError::InvalidState(format!(
                "Application {} was already accepted for project {}",
                accepted.id, project.id
            )));
        }
        Some(application.freelancer_id)
    } else {
        None
    };

    Ok(ProjectChange::DecideApplication {
        application_id,
        decision,
        assign_to,
    })
}

// ---------------------------------------------------------------------------
// Peripheral edits
// ---------------------------------------------------------------------------

/// Request body for editing a project. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub deadline: Option<Timestamp>,
    pub category: Option<String>,
    pub image_ref: Option<String>,
    /// When set, the edit only applies if the project is still at this version.
    pub expected_version: Option<i64>,
}

/// Edit the client-editable fields of a non-terminal project.
pub fn edit_details(
    project: &Project,
    caller: &Caller,
    input: UpdateProjectRequest,
    now: Timestamp,
) -> Result<ProjectChange, CoreError> {
    ensure_owner(project, caller, "edit it")?;

    if let Some(expected) = input.expected_version {
        if expected != project.version {
            return Err(CoreError::Conflict(format!(
                "Project {} is at version {}, expected {expected}",
                project.id, project.version
            )));
        }
    }

    if project.status.is_terminal() {
        return Err(CoreError::InvalidState(format!(
            "Project {} is {} and can no longer be edited",
            project.id, project.status
        )));
    }

    let title = match input.title {
        Some(title) => required_text(Some(title), "title")?,
        None => project.title.clone(),
    };
    let description = match input.description {
        Some(description) => required_text(Some(description), "description")?,
        None => project.description.clone(),
    };
    let budget = match input.budget {
        Some(budget) => {
            validate_budget(budget)?;
            budget
        }
        None => project.budget,
    };
    let deadline = match input.deadline {
        Some(deadline) => {
            validate_deadline(deadline, now)?;
            deadline
        }
        None => project.deadline,
    };
    let category = match input.category {
        Some(category) => optional_text(Some(category)),
        None => project.category.clone(),
    };
    let image_ref = match input.image_ref {
        Some(image_ref) => optional_text(Some(image_ref)),
        None => project.image_ref.clone(),
    };

    Ok(ProjectChange::EditDetails(ProjectDetails {
        title,
        description,
        budget,
        deadline,
        category,
        image_ref,
    }))
}

/// Move a project to `completed` or `cancelled`.
pub fn change_status(
    project: &Project,
    caller: &Caller,
    target: ProjectStatus,
) -> Result<ProjectChange, CoreError> {
    ensure_owner(project, caller, "change its status")?;

    let allowed_from: &[ProjectStatus] = match target {
        ProjectStatus::Completed => &[ProjectStatus::InProgress],
        ProjectStatus::Cancelled => &[ProjectStatus::Open, ProjectStatus::InProgress],
        ProjectStatus::Open | ProjectStatus::InProgress => {
            return Err(CoreError::Validation(
                "status can only be changed to 'completed' or 'cancelled'".into(),
            ))
        }
    };

    if !allowed_from.contains(&project.status) {
        return Err(CoreError::InvalidState(format!(
            "Project {} cannot move from {} to {target}",
            project.id, project.status
        )));
    }

    Ok(ProjectChange::ChangeStatus { status: target })
}

/// Check that `caller` may delete the project. In-progress work must be
/// cancelled first.
pub fn ensure_deletable(project: &Project, caller: &Caller) -> Result<(), CoreError> {
    ensure_owner(project, caller, "delete it")?;
    if project.status == ProjectStatus::InProgress {
        return Err(CoreError::InvalidState(format!(
            "Project {} is in progress; cancel it before deleting",
            project.id
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fail with `Forbidden` unless `caller` is the project's client.
pub fn ensure_owner(project: &Project, caller: &Caller, action: &str) -> Result<(), CoreError> {
    if !project.is_client(caller.user_id) {
        return Err(CoreError::Forbidden(format!(
            "Only the client who posted project {} can {action}",
            project.id
        )));
    }
    Ok(())
}

fn required_text(value: Option<String>, field: &str) -> Result<String, CoreError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(CoreError::Validation(format!("{field} is required"))),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_budget(budget: f64) -> Result<(), CoreError> {
    if !budget.is_finite() || budget <= 0.0 {
        return Err(CoreError::Validation(
            "budget must be a positive amount".into(),
        ));
    }
    Ok(())
}

fn validate_deadline(deadline: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if deadline <= now {
        return Err(CoreError::Validation(
            "deadline must be in the future".into(),
        ));
    }
    Ok(())
}
