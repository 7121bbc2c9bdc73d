//! Application submission rules.
//!
//! The stored answer list is always built from the project's own question
//! list: question text never comes from the applicant, missing answers are
//! backfilled with an empty string, and surplus answers are dropped.

use serde::Deserialize;

use crate::caller::Caller;
use crate::error::CoreError;
use crate::lifecycle::{NewApplication, ProjectChange};
use crate::project::{Answer, Project, Question};
use crate::roles::Role;
use crate::status::ProjectStatus;

/// One answer as supplied by an applicant.
///
/// Accepts either a bare string or an object carrying `answer_text`. Any
/// `question_text` in the object form is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    Text(String),
    Pair {
        #[serde(default, alias = "questionText")]
        question_text: Option<String>,
        #[serde(default, alias = "answerText")]
        answer_text: String,
    },
}

impl AnswerInput {
    pub fn into_text(self) -> String {
        match self {
            AnswerInput::Text(text) => text,
            AnswerInput::Pair { answer_text, .. } => answer_text,
        }
    }
}

/// Request body for `POST /projects/{id}/apply`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplyRequest {
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
    pub resume_ref: Option<String>,
}

/// Pair every project question with the supplied answer at the same index.
pub fn build_answers(questions: &[Question], supplied: Vec<AnswerInput>) -> Vec<Answer> {
    let mut supplied = supplied.into_iter().map(AnswerInput::into_text);
    questions
        .iter()
        .map(|question| Answer {
            question_text: question.text.clone(),
            answer_text: supplied.next().unwrap_or_default(),
        })
        .collect()
}

/// Judge a freelancer's application to `project`.
///
/// Checks, in order: the project is open (`InvalidState` for any caller),
/// the caller is a freelancer (`Forbidden`), and the caller has not applied
/// before (`Conflict`).
pub fn submit_application(
    project: &Project,
    caller: &Caller,
    input: ApplyRequest,
) -> Result<ProjectChange, CoreError> {
    if project.status != ProjectStatus::Open {
        return Err(CoreError::InvalidState(format!(
            "Project {} is {}; applications are only accepted while it is open",
            project.id, project.status
        )));
    }

    caller.require_role(Role::Freelancer, "apply to projects")?;

    if let Some(existing) = project.application_from(caller.user_id) {
        return Err(CoreError::Conflict(format!(
            "You already applied to project {} (application {})",
            project.id, existing.id
        )));
    }

    let resume_ref = input
        .resume_ref
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    Ok(ProjectChange::SubmitApplication(NewApplication {
        freelancer_id: caller.user_id,
        answers: build_answers(&project.questions, input.answers),
        resume_ref,
    }))
}
