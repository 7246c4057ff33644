//! Integration Test: ロール別アクセスゲート
//!
//! staffは管理系グループに入れず、拒否時はハンドラーも操作ログも動かないことを検証する。

use axum::http::{Method, StatusCode};
use collegehub::common::auth::Role;
use collegehub::db;
use collegehub::policy::{AccessPolicy, RouteGroup};
use serde_json::{json, Map, Value};

use crate::support::spawn_app;

async fn seed_departments(pool: &sqlx::SqlitePool, count: usize) {
    for i in 1..=count {
        let mut payload = Map::new();
        payload.insert("name".to_string(), json!(format!("Department {}", i)));
        db::resources::create(pool, "departments", payload)
            .await
            .expect("seed department");
    }
}

#[tokio::test]
async fn test_staff_delete_department_is_denied_without_side_effects() {
    let app = spawn_app().await;
    seed_departments(&app.pool, 3).await;
    let staff = app.create_user("Staff", &[Role::Staff]).await;

    let response = app
        .send(Method::DELETE, "/api/departments/3", Some(&staff.token), None)
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body,
        json!({ "message": "Unauthorized. Staff do not have access to this resource." })
    );

    let record = db::resources::find(&app.pool, "departments", 3)
        .await
        .unwrap()
        .expect("department 3 still exists");
    assert_eq!(record.payload["name"], json!("Department 3"));
    assert_eq!(app.activity_log_count().await, 0);
}

#[tokio::test]
async fn test_staff_is_denied_on_every_administrative_group() {
    let app = spawn_app().await;
    let staff = app.create_user("Staff", &[Role::Staff]).await;

    for group in RouteGroup::ADMINISTRATIVE {
        let uri = format!("/api/{}", group.slug());
        let response = app.send(Method::GET, &uri, Some(&staff.token), None).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "GET {}", uri);

        if group == RouteGroup::ActivityLogs {
            continue;
        }
        let response = app
            .send(Method::POST, &uri, Some(&staff.token), Some(json!({ "name": "x" })))
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "POST {}", uri);
    }

    assert_eq!(app.activity_log_count().await, 0);
}

#[tokio::test]
async fn test_staff_can_use_non_administrative_groups() {
    let app = spawn_app().await;
    let staff = app.create_user("Staff", &[Role::Staff]).await;

    let response = app
        .send(
            Method::POST,
            "/api/attendance",
            Some(&staff.token),
            Some(json!({ "student_id": 7, "status": "present" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["status"], json!("present"));

    let logs = app.activity_logs().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].0.as_deref(), Some(staff.id.to_string().as_str()));
    assert_eq!(logs[0].1, "POST /api/attendance");
}

#[tokio::test]
async fn test_admin_role_overrides_staff_restriction() {
    let app = spawn_app().await;
    seed_departments(&app.pool, 1).await;
    let both = app.create_user("Dean", &[Role::Staff, Role::Admin]).await;

    let response = app
        .send(Method::DELETE, "/api/departments/1", Some(&both.token), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], json!("Deleted successfully."));
    assert!(db::resources::find(&app.pool, "departments", 1)
        .await
        .unwrap()
        .is_none());
    assert_eq!(app.activity_log_count().await, 1);
}

#[tokio::test]
async fn test_student_is_not_restricted_by_default_policy() {
    let app = spawn_app().await;
    let student = app.create_user("Student", &[Role::Student]).await;

    let response = app
        .send(Method::GET, "/api/departments", Some(&student.token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_custom_policy_denial_uses_role_label() {
    let app = crate::support::spawn_app_with_config(
        AccessPolicy::default().deny(Role::Student, RouteGroup::Marks),
        collegehub::config::AuditConfig::default(),
    )
    .await;
    let student = app.create_user("Student", &[Role::Student]).await;

    let response = app
        .send(Method::POST, "/api/marks", Some(&student.token), Some(json!({ "score": 100 })))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(
        response.body["message"],
        json!("Unauthorized. Students do not have access to this resource.")
    );
    assert_eq!(app.activity_log_count().await, 0);
}
