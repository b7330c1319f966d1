use rollcall::{
    InternalError,
    asana::{AsanaClient, TaskTracker},
    roster::fetch_students,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

const EMAIL_FIELD: &str = "1203266261019373";

fn client(server: &MockServer) -> AsanaClient {
    AsanaClient::new(reqwest::Client::new(), server.uri(), "test-token")
}

fn task(gid: &str, name: &str, email: Option<&str>) -> serde_json::Value {
    json!({
        "gid": gid,
        "name": name,
        "custom_fields": [
            { "gid": "999", "text_value": "unrelated" },
            { "gid": EMAIL_FIELD, "text_value": email },
        ]
    })
}

fn internal(err: &anyhow::Error) -> Option<&InternalError> {
    err.downcast_ref::<InternalError>()
}

#[tokio::test]
async fn project_tasks_follows_pagination() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/42/tasks"))
        .and(query_param("offset", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [task("3", "Grace Hopper", Some("grace@x"))],
            "next_page": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/projects/42/tasks"))
        .and(query_param("opt_fields", "name,custom_fields"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                task("1", "Ada Lovelace", Some("ada@x")),
                task("2", "Alan Turing", Some("alan@x")),
            ],
            "next_page": { "offset": "page-2", "path": "/projects/42/tasks?offset=page-2" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client(&server).project_tasks("42").await.expect("tasks");

    let gids: Vec<&str> = tasks.iter().map(|t| t.gid.as_str()).collect();
    assert_eq!(gids, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn students_without_email_are_skipped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/42/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                task("1", "Ada Lovelace", Some("ada@x")),
                task("2", "Week 3 announcements", None),
                task("3", "Syllabus", Some("  ")),
                { "gid": "4", "name": "No fields at all", "custom_fields": [] },
            ]
        })))
        .mount(&server)
        .await;

    let students = fetch_students(&client(&server), "42", EMAIL_FIELD)
        .await
        .expect("students");

    assert_eq!(students.len(), 1);
    assert_eq!(students[0].id, "1");
    assert_eq!(students[0].name, "Ada Lovelace");
    assert_eq!(students[0].email, "ada@x");
}

#[tokio::test]
async fn unknown_project_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/nope/tasks"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server)
        .project_tasks("nope")
        .await
        .expect_err("404 should fail");

    assert!(matches!(internal(&err), Some(InternalError::NotFound(id)) if id == "nope"));
}

#[tokio::test]
async fn rejected_token_is_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server)
        .project_tasks("42")
        .await
        .expect_err("401 should fail");

    assert!(matches!(internal(&err), Some(InternalError::Unauthorized)));
}

#[tokio::test]
async fn throttling_is_rate_limited_with_retry_hint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_subtask("7", "[Assessment: Arrays] - 90%")
        .await
        .expect_err("429 should fail");

    assert!(matches!(
        internal(&err),
        Some(InternalError::RateLimited {
            retry_after_secs: Some(30)
        })
    ));
}

#[tokio::test]
async fn other_failures_are_not_internal_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server)
        .project_tasks("42")
        .await
        .expect_err("500 should fail");

    assert!(internal(&err).is_none());
    assert!(err.downcast_ref::<reqwest::Error>().is_some());
}

#[tokio::test]
async fn malformed_listing_is_an_unexpected_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tasks": [] })))
        .mount(&server)
        .await;

    let err = client(&server)
        .project_tasks("42")
        .await
        .expect_err("missing data envelope");

    assert!(internal(&err).is_none());
}

#[tokio::test]
async fn create_subtask_posts_name_under_parent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/7/subtasks"))
        .and(body_json(json!({ "data": { "name": "[Assessment: Arrays] - 90%" } })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "gid": "1001", "name": "[Assessment: Arrays] - 90%" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gid = client(&server)
        .create_subtask("7", "[Assessment: Arrays] - 90%")
        .await
        .expect("subtask");

    assert_eq!(gid, "1001");
}
