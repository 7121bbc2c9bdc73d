//! The project aggregate: a project plus the questions, applications and
//! progress updates it owns.
//!
//! Children never reference the parent; containment is the relationship.
//! The aggregate is the unit of atomicity for every mutation.

use serde::Serialize;

use crate::status::{ApplicationStatus, ProjectStatus};
use crate::types::{DbId, Timestamp};

/// A screening question defined by the client at creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    /// 0-based position within the project's question list.
    pub position: i32,
    pub text: String,
}

/// One stored answer, positionally aligned with the project's questions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub question_text: String,
    pub answer_text: String,
}

/// A freelancer's application to a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: DbId,
    pub freelancer_id: DbId,
    pub answers: Vec<Answer>,
    pub resume_ref: Option<String>,
    pub status: ApplicationStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An append-only progress entry posted by the assigned freelancer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub id: DbId,
    pub freelancer_id: DbId,
    pub progress: i16,
    pub note: String,
    pub created_at: Timestamp,
}

/// The root aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub deadline: Timestamp,
    pub client_id: DbId,
    pub freelancer_id: Option<DbId>,
    pub status: ProjectStatus,
    pub category: Option<String>,
    pub image_ref: Option<String>,
    pub questions: Vec<Question>,
    /// Submission order.
    pub applications: Vec<Application>,
    /// Insertion order.
    pub updates: Vec<ProgressUpdate>,
    /// Incremented on every committed mutation.
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    pub fn is_client(&self, user_id: DbId) -> bool {
        self.client_id == user_id
    }

    pub fn is_assignee(&self, user_id: DbId) -> bool {
        self.freelancer_id == Some(user_id)
    }

    pub fn find_application(&self, application_id: DbId) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == application_id)
    }

    pub fn application_from(&self, freelancer_id: DbId) -> Option<&Application> {
        self.applications
            .iter()
            .find(|a| a.freelancer_id == freelancer_id)
    }

    pub fn accepted_application(&self) -> Option<&Application> {
        self.applications
            .iter()
            .find(|a| a.status == ApplicationStatus::Accepted)
    }

    /// `status == open` implies no freelancer; `in_progress`/`completed`
    /// imply one. Cancelled projects may carry either.
    pub fn freelancer_binding_is_consistent(&self) -> bool {
        match self.status {
            ProjectStatus::Open => self.freelancer_id.is_none(),
            ProjectStatus::InProgress | ProjectStatus::Completed => self.freelancer_id.is_some(),
            ProjectStatus::Cancelled => true,
        }
    }
}

/// Per-status project counts for dashboard views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub open: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub total: i64,
}

impl StatusSummary {
    /// Fold `(status, count)` pairs into a summary. Repeated statuses add up.
    pub fn from_counts(counts: impl IntoIterator<Item = (ProjectStatus, i64)>) -> Self {
        let mut summary = Self::default();
        for (status, count) in counts {
            match status {
                ProjectStatus::Open => summary.open += count,
                ProjectStatus::InProgress => summary.in_progress += count,
                ProjectStatus::Completed => summary.completed += count,
                ProjectStatus::Cancelled => summary.cancelled += count,
            }
            summary.total += count;
        }
        summary
    }
}
