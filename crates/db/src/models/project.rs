//! Project aggregate rows and assembly.
//!
//! The aggregate is spread over `projects`, `project_questions`,
//! `project_applications`, `application_answers` and `project_updates`.
//! Repositories fetch each table in bulk and [`assemble`] folds the rows back
//! into [`gighub_core::project::Project`] values.

use std::collections::HashMap;

use gighub_core::ledger::ProjectUpdateEntry;
use gighub_core::project::{Answer, Application, ProgressUpdate, Project, Question};
use gighub_core::status::{ApplicationStatus, ProjectStatus, StatusId};
use gighub_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub deadline: Timestamp,
    pub client_id: DbId,
    pub freelancer_id: Option<DbId>,
    pub status_id: StatusId,
    pub category: Option<String>,
    pub image_ref: Option<String>,
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `project_questions` table.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub project_id: DbId,
    pub position: i32,
    pub text: String,
}

/// A row from the `project_applications` table.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: DbId,
    pub project_id: DbId,
    pub freelancer_id: DbId,
    pub resume_ref: Option<String>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `application_answers` table.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerRow {
    pub application_id: DbId,
    pub position: i32,
    pub question_text: String,
    pub answer_text: String,
}

/// A row from the `project_updates` table.
#[derive(Debug, Clone, FromRow)]
pub struct UpdateRow {
    pub id: DbId,
    pub project_id: DbId,
    pub freelancer_id: DbId,
    pub progress: i16,
    pub note: String,
    pub created_at: Timestamp,
}

/// A `project_updates` row joined with its project's title.
#[derive(Debug, Clone, FromRow)]
pub struct UpdateFeedRow {
    pub id: DbId,
    pub project_id: DbId,
    pub project_title: String,
    pub freelancer_id: DbId,
    pub progress: i16,
    pub note: String,
    pub created_at: Timestamp,
}

impl From<UpdateFeedRow> for ProjectUpdateEntry {
    fn from(row: UpdateFeedRow) -> Self {
        Self {
            project_id: row.project_id,
            project_title: row.project_title,
            update: ProgressUpdate {
                id: row.id,
                freelancer_id: row.freelancer_id,
                progress: row.progress,
                note: row.note,
                created_at: row.created_at,
            },
        }
    }
}

/// Which side of a project a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Client,
    Freelancer,
}

impl Participant {
    /// The `projects` column that binds this participant.
    pub fn column(self) -> &'static str {
        match self {
            Participant::Client => "client_id",
            Participant::Freelancer => "freelancer_id",
        }
    }
}

/// Filters for the public project listing.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub category: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

fn decode_error(what: &str, id: StatusId) -> sqlx::Error {
    sqlx::Error::Decode(format!("unknown {what} status id {id}").into())
}

/// Fold table rows into aggregates, preserving the order of `projects`.
///
/// Children must already be ordered: questions by position, applications
/// and updates by id, answers by (application, position).
pub fn assemble(
    projects: Vec<ProjectRow>,
    questions: Vec<QuestionRow>,
    applications: Vec<ApplicationRow>,
    answers: Vec<AnswerRow>,
    updates: Vec<UpdateRow>,
) -> Result<Vec<Project>, sqlx::Error> {
    let mut questions_by_project: HashMap<DbId, Vec<Question>> = HashMap::new();
    for row in questions {
        questions_by_project
            .entry(row.project_id)
            .or_default()
            .push(Question {
                position: row.position,
                text: row.text,
            });
    }

    let mut answers_by_application: HashMap<DbId, Vec<Answer>> = HashMap::new();
    for row in answers {
        answers_by_application
            .entry(row.application_id)
            .or_default()
            .push(Answer {
                question_text: row.question_text,
                answer_text: row.answer_text,
            });
    }

    let mut applications_by_project: HashMap<DbId, Vec<Application>> = HashMap::new();
    for row in applications {
        let status = ApplicationStatus::from_id(row.status_id)
            .ok_or_else(|| decode_error("application", row.status_id))?;
        applications_by_project
            .entry(row.project_id)
            .or_default()
            .push(Application {
                id: row.id,
                freelancer_id: row.freelancer_id,
                answers: answers_by_application.remove(&row.id).unwrap_or_default(),
                resume_ref: row.resume_ref,
                status,
                created_at: row.created_at,
                updated_at: row.updated_at,
            });
    }

    let mut updates_by_project: HashMap<DbId, Vec<ProgressUpdate>> = HashMap::new();
    for row in updates {
        updates_by_project
            .entry(row.project_id)
            .or_default()
            .push(ProgressUpdate {
                id: row.id,
                freelancer_id: row.freelancer_id,
                progress: row.progress,
                note: row.note,
                created_at: row.created_at,
            });
    }

    projects
        .into_iter()
        .map(|row| {
            let status = ProjectStatus::from_id(row.status_id)
                .ok_or_else(|| decode_error("project", row.status_id))?;
            Ok(Project {
                id: row.id,
                title: row.title,
                description: row.description,
                budget: row.budget,
                deadline: row.deadline,
                client_id: row.client_id,
                freelancer_id: row.freelancer_id,
                status,
                category: row.category,
                image_ref: row.image_ref,
                questions: questions_by_project.remove(&row.id).unwrap_or_default(),
                applications: applications_by_project.remove(&row.id).unwrap_or_default(),
                updates: updates_by_project.remove(&row.id).unwrap_or_default(),
                version: row.version,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
        })
        .collect()
}
