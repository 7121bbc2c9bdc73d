//! HTTP-level integration tests for the project lifecycle.
//!
//! Tests cover creation, applications, acceptance, direct assignment,
//! progress updates, status changes, deletion and the caller-scoped views.

mod common;

use axum::http::StatusCode;
use axum::Router;
use chrono::{Duration, Utc};
use common::{
    body_json, delete_auth, get_auth, post_json_auth, put_auth, put_json_auth,
    register_and_login, TestUser,
};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Cast {
    app: Router,
    client: TestUser,
    freelancer: TestUser,
    other_freelancer: TestUser,
}

async fn cast(pool: PgPool) -> Cast {
    let app = common::build_test_app(pool);
    let client = register_and_login(&app, "Casey", "c@example.com", "client").await;
    let freelancer = register_and_login(&app, "Fran", "f@example.com", "freelancer").await;
    let other_freelancer = register_and_login(&app, "Flo", "f2@example.com", "freelancer").await;
    Cast {
        app,
        client,
        freelancer,
        other_freelancer,
    }
}

fn project_body(title: &str, questions: &[&str]) -> Value {
    json!({
        "title": title,
        "description": "Build a landing page",
        "budget": 500,
        "deadline": Utc::now() + Duration::days(14),
        "category": "web",
        "questions": questions,
    })
}

async fn create_project(cast: &Cast, title: &str, questions: &[&str]) -> Value {
    let response = post_json_auth(
        cast.app.clone(),
        "/api/v1/projects",
        project_body(title, questions),
        &cast.client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn apply(cast: &Cast, project_id: i64, user: &TestUser, answers: Value) -> (StatusCode, Value) {
    let response = post_json_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{project_id}/apply"),
        json!({ "answers": answers, "resume_ref": "uploads/cv.pdf" }),
        &user.token,
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn decide(cast: &Cast, project_id: i64, application_id: i64, status: &str) -> (StatusCode, Value) {
    let response = put_json_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{project_id}/applications/{application_id}"),
        json!({ "status": status }),
        &cast.client.token,
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn post_update(
    cast: &Cast,
    project_id: i64,
    user: &TestUser,
    progress: i64,
    note: &str,
) -> (StatusCode, Value) {
    let response = post_json_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{project_id}/update"),
        json!({ "progress": progress, "note": note }),
        &user.token,
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn set_status(cast: &Cast, project_id: i64, status: &str) -> (StatusCode, Value) {
    let response = put_json_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{project_id}/status"),
        json!({ "status": status }),
        &cast.client.token,
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("id should be a number")
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn hire_and_track_progress_end_to_end(pool: PgPool) {
    let cast = cast(pool).await;

    let project = create_project(&cast, "Landing page", &["Why you?"]).await;
    assert_eq!(project["status"], "open");
    assert_eq!(project["freelancer_id"], Value::Null);
    assert_eq!(project["budget"], 500.0);
    let pid = id_of(&project);

    let (status, json) = apply(&cast, pid, &cast.freelancer, json!(["Because"])).await;
    assert_eq!(status, StatusCode::CREATED);
    let application = &json["data"]["applications"][0];
    assert_eq!(application["status"], "pending");
    assert_eq!(application["answers"][0]["question_text"], "Why you?");
    assert_eq!(application["answers"][0]["answer_text"], "Because");
    let app_id = id_of(application);

    let (status, json) = decide(&cast, pid, app_id, "accepted").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "in_progress");
    assert_eq!(json["data"]["freelancer_id"], cast.freelancer.id);
    assert_eq!(json["data"]["applications"][0]["status"], "accepted");

    let (status, _) = post_update(&cast, pid, &cast.freelancer, 50, "halfway").await;
    assert_eq!(status, StatusCode::OK);

    let response = get_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/updates"),
        &cast.client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updates = body_json(response).await["data"].clone();
    assert_eq!(updates.as_array().unwrap().len(), 1);
    assert_eq!(updates[0]["progress"], 50);
    assert_eq!(updates[0]["note"], "halfway");
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn answers_follow_the_project_questions(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &["Why you?", "Rate?"]).await);

    let (status, json) = apply(
        &cast,
        pid,
        &cast.freelancer,
        json!([{ "question_text": "Injected?", "answer_text": "Because" }]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let answers = json["data"]["applications"][0]["answers"].clone();
    assert_eq!(
        answers,
        json!([
            { "question_text": "Why you?", "answer_text": "Because" },
            { "question_text": "Rate?", "answer_text": "" },
        ])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_cannot_apply(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);

    let (status, json) = apply(&cast, pid, &cast.client, json!([])).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn applying_twice_is_conflict(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);

    let (first, _) = apply(&cast, pid, &cast.freelancer, json!([])).await;
    assert_eq!(first, StatusCode::CREATED);
    let (second, json) = apply(&cast, pid, &cast.freelancer, json!([])).await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn applying_to_missing_project_is_not_found(pool: PgPool) {
    let cast = cast(pool).await;
    let (status, _) = apply(&cast, 99999, &cast.freelancer, json!([])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn applying_to_assigned_project_is_invalid_state(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    let (_, json) = apply(&cast, pid, &cast.freelancer, json!([])).await;
    let app_id = id_of(&json["data"]["applications"][0]);
    decide(&cast, pid, app_id, "accepted").await;

    let (status, json) = apply(&cast, pid, &cast.other_freelancer, json!([])).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_STATE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_one_application_can_be_accepted(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    let (_, first) = apply(&cast, pid, &cast.freelancer, json!([])).await;
    let (_, second) = apply(&cast, pid, &cast.other_freelancer, json!([])).await;
    let first_id = id_of(&first["data"]["applications"][0]);
    let second_id = id_of(&second["data"]["applications"][0]);

    let (status, _) = decide(&cast, pid, first_id, "accepted").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = decide(&cast, pid, second_id, "accepted").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_STATE");

    // The sibling stays pending until the client rejects it.
    let (status, json) = decide(&cast, pid, second_id, "rejected").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["applications"][1]["status"], "rejected");
    assert_eq!(json["data"]["freelancer_id"], cast.freelancer.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_accepts_pick_exactly_one(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    let (_, first) = apply(&cast, pid, &cast.freelancer, json!([])).await;
    let (_, second) = apply(&cast, pid, &cast.other_freelancer, json!([])).await;
    let first_id = id_of(&first["data"]["applications"][0]);
    let second_id = id_of(&second["data"]["applications"][0]);

    let ((a_status, a_json), (b_status, b_json)) = tokio::join!(
        decide(&cast, pid, first_id, "accepted"),
        decide(&cast, pid, second_id, "accepted"),
    );

    let mut statuses = [a_status, b_status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
    let (winner, loser) = if a_status == StatusCode::OK {
        (cast.freelancer.id, b_json)
    } else {
        (cast.other_freelancer.id, a_json)
    };
    assert_eq!(loser["code"], "INVALID_STATE");

    let project = body_json(
        get_auth(cast.app.clone(), &format!("/api/v1/projects/{pid}"), &cast.client.token).await,
    )
    .await["data"]
        .clone();
    assert_eq!(project["status"], "in_progress");
    assert_eq!(project["freelancer_id"], winner);
    let accepted = project["applications"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["status"] == "accepted")
        .count();
    assert_eq!(accepted, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn accept_racing_assign_stays_consistent(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    let (_, json) = apply(&cast, pid, &cast.freelancer, json!([])).await;
    let app_id = id_of(&json["data"]["applications"][0]);
    let version_before = json["data"]["version"].as_i64().unwrap();

    let assign_uri = format!("/api/v1/projects/{pid}/assign/{}", cast.other_freelancer.id);
    let ((accept_status, _), assign_response) = tokio::join!(
        decide(&cast, pid, app_id, "accepted"),
        put_auth(cast.app.clone(), &assign_uri, &cast.client.token),
    );

    // Re-assignment is allowed while in progress, so assign always lands.
    // The accept only lands if it ran first.
    assert_eq!(assign_response.status(), StatusCode::OK);
    assert!(
        accept_status == StatusCode::OK || accept_status == StatusCode::CONFLICT,
        "accept returned {accept_status}"
    );

    let project = body_json(
        get_auth(cast.app.clone(), &format!("/api/v1/projects/{pid}"), &cast.client.token).await,
    )
    .await["data"]
        .clone();
    assert_eq!(project["status"], "in_progress");
    assert_eq!(project["freelancer_id"], cast.other_freelancer.id);
    let expected_application = if accept_status == StatusCode::OK {
        "accepted"
    } else {
        "pending"
    };
    assert_eq!(project["applications"][0]["status"], expected_application);
    let writes = if accept_status == StatusCode::OK { 2 } else { 1 };
    assert_eq!(project["version"].as_i64().unwrap(), version_before + writes);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn decided_application_cannot_be_redecided(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    let (_, json) = apply(&cast, pid, &cast.freelancer, json!([])).await;
    let app_id = id_of(&json["data"]["applications"][0]);

    let (status, _) = decide(&cast, pid, app_id, "rejected").await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = decide(&cast, pid, app_id, "accepted").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_STATE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_decision_is_bad_request(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    let (_, json) = apply(&cast, pid, &cast.freelancer, json!([])).await;
    let app_id = id_of(&json["data"]["applications"][0]);

    let (status, _) = decide(&cast, pid, app_id, "maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = decide(&cast, pid, app_id, "pending").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_the_owner_decides(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    let (_, json) = apply(&cast, pid, &cast.freelancer, json!([])).await;
    let app_id = id_of(&json["data"]["applications"][0]);

    let response = put_json_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/applications/{app_id}"),
        json!({ "status": "accepted" }),
        &cast.freelancer.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Assignment and updates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn direct_assignment_binds_freelancer(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);

    let response = put_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/assign/{}", cast.freelancer.id),
        &cast.client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "in_progress");
    assert_eq!(json["data"]["freelancer_id"], cast.freelancer.id);

    // Assigning a client is rejected.
    let response = put_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/assign/{}", cast.client.id),
        &cast.client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Assigning an unknown user is not found.
    let response = put_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/assign/99999"),
        &cast.client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_the_assignee_posts_updates(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    put_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/assign/{}", cast.freelancer.id),
        &cast.client.token,
    )
    .await;

    let (status, _) = post_update(&cast, pid, &cast.other_freelancer, 10, "sneaky").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = post_update(&cast, pid, &cast.client, 10, "me too").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post_update(&cast, pid, &cast.freelancer, 101, "over").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = post_update(&cast, pid, &cast.freelancer, 20, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The other freelancer may not read the updates either.
    let response = get_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/updates"),
        &cast.other_freelancer.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_reads_hide_updates_and_rival_applications(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &["Why you?"]).await);
    let (_, json) = apply(&cast, pid, &cast.freelancer, json!(["secret answer"])).await;
    let app_id = id_of(&json["data"]["applications"][0]);
    decide(&cast, pid, app_id, "accepted").await;
    let (status, _) = post_update(&cast, pid, &cast.freelancer, 50, "private halfway").await;
    assert_eq!(status, StatusCode::OK);

    let outsider = &cast.other_freelancer.token;
    let single = body_json(
        get_auth(cast.app.clone(), &format!("/api/v1/projects/{pid}"), outsider).await,
    )
    .await["data"]
        .clone();
    let listed = body_json(get_auth(cast.app.clone(), "/api/v1/projects", outsider).await).await
        ["data"][0]
        .clone();
    for view in [single, listed] {
        assert_eq!(view["id"], pid);
        assert_eq!(view["updates"], json!([]));
        assert_eq!(view["applications"], json!([]));
    }

    // The assignee sees the updates and only their own application.
    let own = body_json(
        get_auth(cast.app.clone(), &format!("/api/v1/projects/{pid}"), &cast.freelancer.token).await,
    )
    .await["data"]
        .clone();
    assert_eq!(own["updates"][0]["note"], "private halfway");
    assert_eq!(own["applications"].as_array().unwrap().len(), 1);

    let client = body_json(
        get_auth(cast.app.clone(), &format!("/api/v1/projects/{pid}"), &cast.client.token).await,
    )
    .await["data"]
        .clone();
    assert_eq!(client["applications"][0]["answers"][0]["answer_text"], "secret answer");
    assert_eq!(client["updates"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn updates_are_listed_newest_first(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    put_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/assign/{}", cast.freelancer.id),
        &cast.client.token,
    )
    .await;
    for (progress, note) in [(10, "started"), (40, "wireframes"), (70, "styling")] {
        let (status, _) = post_update(&cast, pid, &cast.freelancer, progress, note).await;
        assert_eq!(status, StatusCode::OK);
    }

    let uri = format!("/api/v1/projects/{pid}/updates");
    let first = body_json(get_auth(cast.app.clone(), &uri, &cast.freelancer.token).await).await;
    let second = body_json(get_auth(cast.app.clone(), &uri, &cast.client.token).await).await;
    assert_eq!(first, second, "listing is idempotent and the same for both parties");

    let progress: Vec<i64> = first["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["progress"].as_i64().unwrap())
        .collect();
    assert_eq!(progress, vec![70, 40, 10]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_feed_spans_projects(pool: PgPool) {
    let cast = cast(pool).await;
    for title in ["A", "B"] {
        let pid = id_of(&create_project(&cast, title, &[]).await);
        put_auth(
            cast.app.clone(),
            &format!("/api/v1/projects/{pid}/assign/{}", cast.freelancer.id),
            &cast.client.token,
        )
        .await;
        post_update(&cast, pid, &cast.freelancer, 25, &format!("{title} started")).await;
    }

    let response = get_auth(cast.app.clone(), "/api/v1/projects/updates", &cast.client.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let feed = body_json(response).await["data"].clone();
    assert_eq!(feed.as_array().unwrap().len(), 2);
    assert_eq!(feed[0]["project_title"], "B");
    assert_eq!(feed[0]["note"], "B started");
    assert_eq!(feed[1]["project_title"], "A");

    let response = get_auth(
        cast.app.clone(),
        "/api/v1/projects/updates",
        &cast.freelancer.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Status, edits and deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_transitions_are_enforced(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);

    let (status, json) = set_status(&cast, pid, "completed").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "INVALID_STATE");

    let (status, _) = set_status(&cast, pid, "open").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    put_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/assign/{}", cast.freelancer.id),
        &cast.client.token,
    )
    .await;
    let (status, json) = set_status(&cast, pid, "completed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "completed");
    assert_eq!(json["data"]["freelancer_id"], cast.freelancer.id);

    // Completed work takes no more updates or assignments.
    let (status, _) = post_update(&cast, pid, &cast.freelancer, 100, "late").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = set_status(&cast, pid, "cancelled").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn owner_edits_details_with_version_check(pool: PgPool) {
    let cast = cast(pool).await;
    let project = create_project(&cast, "P", &[]).await;
    let pid = id_of(&project);
    let version = project["version"].as_i64().unwrap();

    let response = put_json_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}"),
        json!({ "budget": 750, "expected_version": version }),
        &cast.client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["budget"], 750.0);
    assert_eq!(json["data"]["title"], "P");
    assert_eq!(json["data"]["version"], version + 1);

    let response = put_json_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}"),
        json!({ "title": "Stale", "expected_version": version }),
        &cast.client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = put_json_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}"),
        json!({ "title": "Hijack" }),
        &cast.freelancer.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleted_project_disappears(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    let uri = format!("/api/v1/projects/{pid}");

    let response = delete_auth(cast.app.clone(), &uri, &cast.freelancer.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(cast.app.clone(), &uri, &cast.client.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(cast.app.clone(), &uri, &cast.client.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn in_progress_project_cannot_be_deleted(pool: PgPool) {
    let cast = cast(pool).await;
    let pid = id_of(&create_project(&cast, "P", &[]).await);
    put_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}/assign/{}", cast.freelancer.id),
        &cast.client.token,
    )
    .await;

    let response = delete_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{pid}"),
        &cast.client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Creation and listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn freelancer_cannot_create_project(pool: PgPool) {
    let cast = cast(pool).await;
    let response = post_json_auth(
        cast.app.clone(),
        "/api/v1/projects",
        project_body("P", &[]),
        &cast.freelancer.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_project_is_bad_request(pool: PgPool) {
    let cast = cast(pool).await;
    let mut past_deadline = project_body("P", &[]);
    past_deadline["deadline"] = json!(Utc::now() - Duration::days(1));
    let mut zero_budget = project_body("P", &[]);
    zero_budget["budget"] = json!(0);
    let mut missing_title = project_body("P", &[]);
    missing_title.as_object_mut().unwrap().remove("title");

    for body in [past_deadline, zero_budget, missing_title] {
        let response =
            post_json_auth(cast.app.clone(), "/api/v1/projects", body.clone(), &cast.client.token)
                .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_filters_and_caller_views(pool: PgPool) {
    let cast = cast(pool).await;
    let a = id_of(&create_project(&cast, "A", &[]).await);
    let b = id_of(&create_project(&cast, "B", &[]).await);
    put_auth(
        cast.app.clone(),
        &format!("/api/v1/projects/{a}/assign/{}", cast.freelancer.id),
        &cast.client.token,
    )
    .await;
    set_status(&cast, b, "cancelled").await;

    let list = |uri: &'static str, token: String| {
        let app = cast.app.clone();
        async move { body_json(get_auth(app, uri, &token).await).await["data"].clone() }
    };

    let all = list("/api/v1/projects", cast.freelancer.token.clone()).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(all[0]["title"], "B");

    let in_progress = list("/api/v1/projects?status=in_progress", cast.freelancer.token.clone()).await;
    assert_eq!(in_progress.as_array().unwrap().len(), 1);
    assert_eq!(in_progress[0]["id"], a);

    let paged = list("/api/v1/projects?limit=1&offset=1", cast.client.token.clone()).await;
    assert_eq!(paged.as_array().unwrap().len(), 1);
    assert_eq!(paged[0]["title"], "A");

    let response = get_auth(
        cast.app.clone(),
        "/api/v1/projects?status=archived",
        &cast.client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mine = list("/api/v1/projects/mine", cast.freelancer.token.clone()).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    let none = list("/api/v1/projects/mine", cast.other_freelancer.token.clone()).await;
    assert!(none.as_array().unwrap().is_empty());

    let summary = list("/api/v1/projects/mine/summary", cast.client.token.clone()).await;
    assert_eq!(
        summary,
        json!({ "open": 0, "in_progress": 1, "completed": 0, "cancelled": 1, "total": 2 })
    );
}
