//! Integration Test: ログインとトークン認証

use axum::http::{Method, StatusCode};
use collegehub::common::auth::Role;
use serde_json::json;

use crate::support::{spawn_app, TEST_PASSWORD};

#[tokio::test]
async fn test_login_returns_token_usable_for_api() {
    let app = spawn_app().await;
    let staff = app.create_user("Staff", &[Role::Staff]).await;

    let response = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": staff.email, "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["roles"], json!(["staff"]));
    assert!(response.body["user"].get("password_hash").is_none());

    let token = response.body["token"].as_str().unwrap().to_string();
    let me = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], json!(staff.email));

    // ログインは未認証リクエストなので記録されない
    assert_eq!(app.activity_log_count().await, 0);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = spawn_app().await;
    let staff = app.create_user("Staff", &[Role::Staff]).await;

    let response = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": staff.email, "password": "wrong" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], json!("Unauthenticated."));

    let response = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@college.edu", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let app = spawn_app().await;

    let response = app.send(Method::GET, "/api/departments", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], json!("Unauthenticated."));
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    let app = spawn_app().await;
    let student = app.create_user("Student", &[Role::Student]).await;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(student.id.to_string())
        .execute(&app.pool)
        .await
        .unwrap();

    let response = app
        .send(Method::GET, "/api/attendance", Some(&student.token), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
