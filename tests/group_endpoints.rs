//! HTTP tests for group listing, creation, details, renaming and deletion.

mod common;

use axum::http::StatusCode;
use common::{Backend, TestApp, assert_error};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case::in_memory(Backend::InMemory)]
#[case::sqlite(Backend::Sqlite)]
#[tokio::test]
async fn creator_sees_group_as_admin(#[case] backend: Backend) {
    let app = TestApp::new(backend).await;
    let ana = app.user("ana@example.com").await;
    let group_id = app.group(&ana, "Smiths").await;

    let (status, list) = app.get("/groups", &ana.token).await;
    let (_, details) = app.get(&format!("/groups/{group_id}"), &ana.token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Smiths");
    assert_eq!(list[0]["role"], "admin");
    assert_eq!(list[0]["member_count"], 1);
    assert_eq!(details["role"], "admin");
    assert_eq!(details["members"][0]["email"], "ana@example.com");
}

#[rstest]
#[case::too_short("Abcd")]
#[case::too_long("The Smith Family")]
#[case::blank("       ")]
#[tokio::test]
async fn create_group_validates_name(#[case] name: &str) {
    let app = TestApp::new(Backend::InMemory).await;
    let ana = app.user("ana@example.com").await;

    let response = app.post("/groups", &ana.token, json!({ "name": name })).await;

    assert_error(&response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR");
    assert_eq!(response.1["details"][0]["field"], "name");
}

#[rstest]
#[case::in_memory(Backend::InMemory)]
#[case::sqlite(Backend::Sqlite)]
#[tokio::test]
async fn details_report_missing_before_forbidden(#[case] backend: Backend) {
    let app = TestApp::new(backend).await;
    let ana = app.user("ana@example.com").await;
    let ben = app.user("ben@example.com").await;
    let group_id = app.group(&ana, "Smiths").await;

    assert_error(
        &app.get("/groups/999", &ben.token).await,
        StatusCode::NOT_FOUND,
        "GROUP_NOT_FOUND",
    );
    assert_error(
        &app.get(&format!("/groups/{group_id}"), &ben.token).await,
        StatusCode::FORBIDDEN,
        "NOT_A_MEMBER",
    );
}

#[rstest]
#[tokio::test]
async fn non_numeric_group_id_is_not_found() {
    let app = TestApp::new(Backend::InMemory).await;
    let ana = app.user("ana@example.com").await;

    let response = app.get("/groups/abc", &ana.token).await;

    assert_error(&response, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[rstest]
#[case::in_memory(Backend::InMemory)]
#[case::sqlite(Backend::Sqlite)]
#[tokio::test]
async fn admin_renames_group(#[case] backend: Backend) {
    let app = TestApp::new(backend).await;
    let ana = app.user("ana@example.com").await;
    let group_id = app.group(&ana, "Smiths").await;

    let (status, body) = app
        .patch(
            &format!("/groups/{group_id}"),
            &ana.token,
            json!({ "name": " Smith Clan " }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Smith Clan");
    assert_eq!(body["previous_name"], "Smiths");
    let (_, details) = app.get(&format!("/groups/{group_id}"), &ana.token).await;
    assert_eq!(details["name"], "Smith Clan");
}

#[rstest]
#[tokio::test]
async fn rename_checks_are_ordered() {
    let app = TestApp::new(Backend::InMemory).await;
    let ana = app.user("ana@example.com").await;
    let ben = app.user("ben@example.com").await;
    let cat = app.user("cat@example.com").await;
    let group_id = app.group(&ana, "Smiths").await;
    app.join(&ana, group_id, &ben).await;
    let path = format!("/groups/{group_id}");
    let invalid = json!({ "name": "x" });

    assert_error(
        &app.patch("/groups/999", &ana.token, invalid.clone()).await,
        StatusCode::NOT_FOUND,
        "GROUP_NOT_FOUND",
    );
    assert_error(
        &app.patch(&path, &cat.token, invalid.clone()).await,
        StatusCode::FORBIDDEN,
        "NOT_A_MEMBER",
    );
    assert_error(
        &app.patch(&path, &ben.token, invalid.clone()).await,
        StatusCode::FORBIDDEN,
        "ADMIN_REQUIRED",
    );
    assert_error(
        &app.patch(&path, &ana.token, invalid).await,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    );
}

#[rstest]
#[case::in_memory(Backend::InMemory)]
#[case::sqlite(Backend::Sqlite)]
#[tokio::test]
async fn deleting_group_removes_members_and_tasks(#[case] backend: Backend) {
    let app = TestApp::new(backend).await;
    let ana = app.user("ana@example.com").await;
    let ben = app.user("ben@example.com").await;
    let group_id = app.group(&ana, "Smiths").await;
    app.join(&ana, group_id, &ben).await;
    app.post(
        &format!("/groups/{group_id}/tasks"),
        &ana.token,
        json!({ "title": "Mow the lawn", "assignee_id": ben.id }),
    )
    .await;

    assert_error(
        &app.delete(&format!("/groups/{group_id}"), &ben.token).await,
        StatusCode::FORBIDDEN,
        "ADMIN_REQUIRED",
    );
    let (status, _) = app.delete(&format!("/groups/{group_id}"), &ana.token).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, groups) = app.get("/groups", &ben.token).await;
    assert_eq!(groups, json!([]));
    let (_, tasks) = app.get("/tasks", &ben.token).await;
    assert_eq!(tasks, json!([]));
}
