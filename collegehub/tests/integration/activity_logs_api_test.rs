//! Integration Test: 操作ログ一覧API
//!
//! `GET /api/activity-logs` は新しい順・ページ単位で返し、staffには拒否される。

use axum::http::{Method, StatusCode};
use collegehub::common::auth::Role;
use serde_json::json;

use crate::support::spawn_app;

#[tokio::test]
async fn test_admin_lists_logs_newest_first_with_user() {
    let app = spawn_app().await;
    let admin = app.create_user("Admin", &[Role::Admin]).await;

    for title in ["first", "second", "third"] {
        let response = app
            .send(Method::POST, "/api/timetable", Some(&admin.token), Some(json!({ "title": title })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }
    app.writer.flush().await;

    let response = app
        .send(Method::GET, "/api/activity-logs?per_page=2", Some(&admin.token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.body;
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["per_page"], json!(2));
    assert_eq!(body["current_page"], json!(1));
    assert_eq!(body["last_page"], json!(2));

    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["action"], json!("POST /api/timetable"));
    assert!(data[0]["description"].as_str().unwrap().contains("third"));
    assert!(data[1]["description"].as_str().unwrap().contains("second"));
    assert_eq!(data[0]["user"]["email"], json!(admin.email));
    assert_eq!(data[0]["user"]["id"], json!(admin.id.to_string()));
    assert_eq!(data[0]["ip_address"], json!("203.0.113.7"));
}

#[tokio::test]
async fn test_listing_is_not_itself_recorded() {
    let app = spawn_app().await;
    let admin = app.create_user("Admin", &[Role::Admin]).await;

    app.send(Method::GET, "/api/activity-logs", Some(&admin.token), None)
        .await;

    assert_eq!(app.activity_log_count().await, 0);
}

#[tokio::test]
async fn test_filters_by_action_prefix_and_user() {
    let app = spawn_app().await;
    let admin = app.create_user("Admin", &[Role::Admin]).await;
    let staff = app.create_user("Staff", &[Role::Staff]).await;

    let created = app
        .send(Method::POST, "/api/leaves", Some(&staff.token), Some(json!({ "days": 2 })))
        .await;
    let id = created.body["id"].as_i64().unwrap();
    app.send(
        Method::DELETE,
        &format!("/api/leaves/{}", id),
        Some(&admin.token),
        None,
    )
    .await;
    app.writer.flush().await;

    let response = app
        .send(Method::GET, "/api/activity-logs?action=DELETE", Some(&admin.token), None)
        .await;
    assert_eq!(response.body["total"], json!(1));
    assert_eq!(
        response.body["data"][0]["action"],
        json!(format!("DELETE /api/leaves/{}", id))
    );

    let uri = format!("/api/activity-logs?user_id={}", staff.id);
    let response = app.send(Method::GET, &uri, Some(&admin.token), None).await;
    assert_eq!(response.body["total"], json!(1));
    assert_eq!(response.body["data"][0]["action"], json!("POST /api/leaves"));
}

#[tokio::test]
async fn test_staff_cannot_read_activity_logs() {
    let app = spawn_app().await;
    let staff = app.create_user("Staff", &[Role::Staff]).await;

    let response = app
        .send(Method::GET, "/api/activity-logs", Some(&staff.token), None)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body["message"],
        json!("Unauthorized. Staff do not have access to this resource.")
    );
}
