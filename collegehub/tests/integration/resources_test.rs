//! Integration Test: 汎用リソースCRUD

use axum::http::{Method, StatusCode};
use collegehub::common::auth::Role;
use serde_json::json;

use crate::support::spawn_app;

#[tokio::test]
async fn test_crud_lifecycle() {
    let app = spawn_app().await;
    let admin = app.create_user("Admin", &[Role::Admin]).await;
    let token = Some(admin.token.as_str());

    let created = app
        .send(
            Method::POST,
            "/api/transport",
            token,
            Some(json!({ "route": "North", "seats": 40 })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_i64().unwrap();
    let item = format!("/api/transport/{}", id);

    let shown = app.send(Method::GET, &item, token, None).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["route"], json!("North"));

    let patched = app
        .send(Method::PATCH, &item, token, Some(json!({ "seats": 45 })))
        .await;
    assert_eq!(patched.body["route"], json!("North"));
    assert_eq!(patched.body["seats"], json!(45));

    let replaced = app
        .send(Method::PUT, &item, token, Some(json!({ "route": "South" })))
        .await;
    assert_eq!(replaced.body["route"], json!("South"));
    assert!(replaced.body.get("seats").is_none());

    let deleted = app.send(Method::DELETE, &item, token, None).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let missing = app.send(Method::GET, &item, token, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_groups_are_isolated() {
    let app = spawn_app().await;
    let admin = app.create_user("Admin", &[Role::Admin]).await;
    let token = Some(admin.token.as_str());

    let created = app
        .send(Method::POST, "/api/marks", token, Some(json!({ "score": 88 })))
        .await;
    let id = created.body["id"].as_i64().unwrap();

    let other = app
        .send(Method::GET, &format!("/api/subjects/{}", id), token, None)
        .await;
    assert_eq!(other.status, StatusCode::NOT_FOUND);

    let listed = app.send(Method::GET, "/api/marks", token, None).await;
    assert_eq!(listed.body["total"], json!(1));
    assert_eq!(listed.body["data"][0]["score"], json!(88));
}

#[tokio::test]
async fn test_listing_clamps_page_parameters() {
    let app = spawn_app().await;
    let admin = app.create_user("Admin", &[Role::Admin]).await;
    let token = Some(admin.token.as_str());

    for n in 0..3 {
        app.send(
            Method::POST,
            "/api/library",
            token,
            Some(json!({ "title": format!("Book {}", n) })),
        )
        .await;
    }

    let listing = app
        .send(Method::GET, "/api/library?page=0&per_page=500", token, None)
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body["current_page"], 1);
    assert_eq!(listing.body["per_page"], 100);
    assert_eq!(listing.body["total"], 3);
    assert_eq!(listing.body["data"].as_array().unwrap().len(), 3);

    let listing = app
        .send(Method::GET, "/api/library?per_page=2&page=2", token, None)
        .await;
    assert_eq!(listing.body["per_page"], 2);
    assert_eq!(listing.body["last_page"], 2);
    assert_eq!(listing.body["data"].as_array().unwrap().len(), 1);
}
