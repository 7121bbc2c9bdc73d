//! Repository for the project aggregate.
//!
//! Reads return fully assembled [`Project`] values. Writes go through
//! [`ProjectRepo::apply_change`] inside a transaction that already holds the
//! project's row lock (see [`ProjectRepo::lock_for_update`]).

use gighub_core::ledger::ProjectUpdateEntry;
use gighub_core::lifecycle::{NewProject, ProjectChange};
use gighub_core::project::Project;
use gighub_core::status::{ProjectStatus, StatusId};
use gighub_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::project::{
    assemble, AnswerRow, ApplicationRow, Participant, ProjectFilter, ProjectRow, QuestionRow,
    UpdateFeedRow, UpdateRow,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, budget, deadline, client_id, freelancer_id, \
                       status_id, category, image_ref, version, created_at, updated_at";

/// Provides aggregate reads and change application for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project with its questions, returning the assembled aggregate.
    pub async fn create(pool: &PgPool, input: &NewProject) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id: DbId = sqlx::query_scalar(
            "INSERT INTO projects \
                (title, description, budget, deadline, client_id, category, image_ref) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(&input.details.title)
        .bind(&input.details.description)
        .bind(input.details.budget)
        .bind(input.details.deadline)
        .bind(input.client_id)
        .bind(&input.details.category)
        .bind(&input.details.image_ref)
        .fetch_one(&mut *tx)
        .await?;

        for (position, text) in input.questions.iter().enumerate() {
            sqlx::query(
                "INSERT INTO project_questions (project_id, position, text) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(position as i32)
            .bind(text)
            .execute(&mut *tx)
            .await?;
        }

        let project = Self::load(&mut tx, id, false)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;
        Ok(project)
    }

    /// Find a project by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::load(&mut conn, id, false).await
    }

    /// Load a project and take its row lock for the rest of the transaction.
    ///
    /// Concurrent writers to the same project queue here; each sees the state
    /// committed by the writer before it.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        Self::load(conn, id, true).await
    }

    /// List projects, newest first, with optional status and category filters.
    pub async fn list(pool: &PgPool, filter: &ProjectFilter) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE deleted_at IS NULL
               AND ($1::SMALLINT IS NULL OR status_id = $1)
               AND ($2::TEXT IS NULL OR category = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        let mut conn = pool.acquire().await?;
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(filter.status.map(ProjectStatus::id))
            .bind(&filter.category)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&mut *conn)
            .await?;
        Self::hydrate(&mut conn, rows).await
    }

    /// List the projects a user owns (client) or is assigned to (freelancer).
    pub async fn list_for_participant(
        pool: &PgPool,
        participant: Participant,
        user_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE {} = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC, id DESC",
            participant.column()
        );
        let mut conn = pool.acquire().await?;
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await?;
        Self::hydrate(&mut conn, rows).await
    }

    /// Count a participant's projects per status.
    pub async fn status_counts(
        pool: &PgPool,
        participant: Participant,
        user_id: DbId,
    ) -> Result<Vec<(StatusId, i64)>, sqlx::Error> {
        let query = format!(
            "SELECT status_id, COUNT(*) FROM projects
             WHERE {} = $1 AND deleted_at IS NULL
             GROUP BY status_id
             ORDER BY status_id",
            participant.column()
        );
        sqlx::query_as::<_, (StatusId, i64)>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Every update on every project `client_id` owns, newest first.
    pub async fn list_updates_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<ProjectUpdateEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, UpdateFeedRow>(
            "SELECT u.id, u.project_id, p.title AS project_title, u.freelancer_id, \
                    u.progress, u.note, u.created_at \
             FROM project_updates u \
             JOIN projects p ON p.id = u.project_id \
             WHERE p.client_id = $1 AND p.deleted_at IS NULL \
             ORDER BY u.created_at DESC, u.id DESC",
        )
        .bind(client_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(ProjectUpdateEntry::from).collect())
    }

    /// Persist a validated change and bump the aggregate version.
    ///
    /// Must run in the transaction that locked the project.
    pub async fn apply_change(
        conn: &mut PgConnection,
        project_id: DbId,
        change: &ProjectChange,
    ) -> Result<(), sqlx::Error> {
        match change {
            ProjectChange::Assign { freelancer_id } => {
                Self::bind_freelancer(conn, project_id, *freelancer_id).await?;
            }
            ProjectChange::SubmitApplication(app) => {
                let application_id: DbId = sqlx::query_scalar(
                    "INSERT INTO project_applications (project_id, freelancer_id, resume_ref) \
                     VALUES ($1, $2, $3) \
                     RETURNING id",
                )
                .bind(project_id)
                .bind(app.freelancer_id)
                .bind(&app.resume_ref)
                .fetch_one(&mut *conn)
                .await?;

                for (position, answer) in app.answers.iter().enumerate() {
                    sqlx::query(
                        "INSERT INTO application_answers \
                            (application_id, position, question_text, answer_text) \
                         VALUES ($1, $2, $3, $4)",
                    )
                    .bind(application_id)
                    .bind(position as i32)
                    .bind(&answer.question_text)
                    .bind(&answer.answer_text)
                    .execute(&mut *conn)
                    .await?;
                }
            }
            ProjectChange::DecideApplication {
                application_id,
                decision,
                assign_to,
            } => {
                sqlx::query(
                    "UPDATE project_applications SET status_id = $3 \
                     WHERE id = $1 AND project_id = $2",
                )
                .bind(application_id)
                .bind(project_id)
                .bind(decision.id())
                .execute(&mut *conn)
                .await?;

                if let Some(freelancer_id) = assign_to {
                    Self::bind_freelancer(conn, project_id, *freelancer_id).await?;
                }
            }
            ProjectChange::PostUpdate(update) => {
                sqlx::query(
                    "INSERT INTO project_updates (project_id, freelancer_id, progress, note) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(project_id)
                .bind(update.freelancer_id)
                .bind(update.progress)
                .bind(&update.note)
                .execute(&mut *conn)
                .await?;
            }
            ProjectChange::EditDetails(details) => {
                sqlx::query(
                    "UPDATE projects SET
                        title = $2,
                        description = $3,
                        budget = $4,
                        deadline = $5,
                        category = $6,
                        image_ref = $7
                     WHERE id = $1",
                )
                .bind(project_id)
                .bind(&details.title)
                .bind(&details.description)
                .bind(details.budget)
                .bind(details.deadline)
                .bind(&details.category)
                .bind(&details.image_ref)
                .execute(&mut *conn)
                .await?;
            }
            ProjectChange::ChangeStatus { status } => {
                sqlx::query("UPDATE projects SET status_id = $2 WHERE id = $1")
                    .bind(project_id)
                    .bind(status.id())
                    .execute(&mut *conn)
                    .await?;
            }
        }

        sqlx::query("UPDATE projects SET version = version + 1 WHERE id = $1")
            .bind(project_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Soft-delete a project. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW(), version = version + 1 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn bind_freelancer(
        conn: &mut PgConnection,
        project_id: DbId,
        freelancer_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET freelancer_id = $2, status_id = $3 WHERE id = $1")
            .bind(project_id)
            .bind(freelancer_id)
            .bind(ProjectStatus::InProgress.id())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn load(
        conn: &mut PgConnection,
        id: DbId,
        lock: bool,
    ) -> Result<Option<Project>, sqlx::Error> {
        let lock_clause = if lock { "FOR UPDATE" } else { "" };
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE id = $1 AND deleted_at IS NULL {lock_clause}"
        );
        let Some(row) = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
        else {
            return Ok(None);
        };
        Ok(Self::hydrate(conn, vec![row]).await?.pop())
    }

    /// Fetch the children of `rows` in one query per table and assemble.
    async fn hydrate(
        conn: &mut PgConnection,
        rows: Vec<ProjectRow>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();

        let questions = sqlx::query_as::<_, QuestionRow>(
            "SELECT project_id, position, text FROM project_questions \
             WHERE project_id = ANY($1) \
             ORDER BY project_id, position",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        let applications = sqlx::query_as::<_, ApplicationRow>(
            "SELECT id, project_id, freelancer_id, resume_ref, status_id, created_at, updated_at \
             FROM project_applications \
             WHERE project_id = ANY($1) \
             ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        let answers = sqlx::query_as::<_, AnswerRow>(
            "SELECT a.application_id, a.position, a.question_text, a.answer_text \
             FROM application_answers a \
             JOIN project_applications pa ON pa.id = a.application_id \
             WHERE pa.project_id = ANY($1) \
             ORDER BY a.application_id, a.position",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        let updates = sqlx::query_as::<_, UpdateRow>(
            "SELECT id, project_id, freelancer_id, progress, note, created_at \
             FROM project_updates \
             WHERE project_id = ANY($1) \
             ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        assemble(rows, questions, applications, answers, updates)
    }
}
