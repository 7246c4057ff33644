//! 統合テスト用ヘルパー
//!
//! インメモリDB上にアプリ全体を組み立て、`tower::ServiceExt::oneshot`で直接リクエストする。

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use collegehub::audit::writer::{ActivityLogWriter, ActivityLogWriterConfig};
use collegehub::auth::{jwt::create_jwt, password::hash_password};
use collegehub::common::auth::Role;
use collegehub::config::AuditConfig;
use collegehub::db::{self, traits::ActivityLogSink};
use collegehub::policy::AccessPolicy;
use collegehub::AppState;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "collegehub-integration-test-secret";
pub const TEST_PASSWORD: &str = "password123";

/// テスト用アプリ一式
#[allow(dead_code)]
pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
    pub writer: ActivityLogWriter,
}

/// テスト用ユーザー
#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// テスト用のレスポンス
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    db::migrations::run_migrations(&pool)
        .await
        .expect("run migrations");
    pool
}

fn writer_config() -> ActivityLogWriterConfig {
    ActivityLogWriterConfig {
        flush_interval_secs: 3600,
        buffer_capacity: 1000,
    }
}

/// 既定ポリシーでアプリを組み立てる（操作ログはSQLiteへ）
#[allow(dead_code)]
pub async fn spawn_app() -> TestApp {
    spawn_app_with_config(AccessPolicy::default(), AuditConfig::default()).await
}

/// ポリシーと記録設定を指定してアプリを組み立てる（操作ログはSQLiteへ）
#[allow(dead_code)]
pub async fn spawn_app_with_config(policy: AccessPolicy, audit_config: AuditConfig) -> TestApp {
    let pool = test_pool().await;
    let state = AppState::new(
        pool.clone(),
        TEST_JWT_SECRET.to_string(),
        policy,
        &audit_config,
        writer_config(),
    );
    let writer = state.activity_recorder.writer().clone();
    TestApp {
        app: collegehub::api::create_app(state),
        pool,
        writer,
    }
}

/// 任意の書き込み先と設定でアプリを組み立てる
#[allow(dead_code)]
pub async fn spawn_app_with(
    sink: Arc<dyn ActivityLogSink>,
    policy: AccessPolicy,
    audit_config: AuditConfig,
) -> TestApp {
    let pool = test_pool().await;
    let writer = ActivityLogWriter::new(sink, writer_config());
    let state = AppState::with_writer(
        pool.clone(),
        TEST_JWT_SECRET.to_string(),
        policy,
        &audit_config,
        writer.clone(),
    );
    TestApp {
        app: collegehub::api::create_app(state),
        pool,
        writer,
    }
}

#[allow(dead_code)]
impl TestApp {
    /// 指定ロールのユーザーを作成してトークンを発行する
    pub async fn create_user(&self, name: &str, roles: &[Role]) -> TestUser {
        let email = format!("{}@college.edu", name.to_ascii_lowercase());
        let password_hash = hash_password(TEST_PASSWORD).expect("hash password");
        let user = db::users::create(&self.pool, name, &email, &password_hash, None)
            .await
            .expect("create user");
        for role in roles {
            db::users::assign_role(&self.pool, user.id, *role)
                .await
                .expect("assign role");
        }
        let token = create_jwt(&user.id.to_string(), TEST_JWT_SECRET).expect("create jwt");
        TestUser {
            id: user.id,
            email,
            token,
        }
    }

    /// JSONリクエストを送信する
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::USER_AGENT, "collegehub-tests/1.0")
            .header("x-forwarded-for", "203.0.113.7");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    /// 組み立て済みのリクエストを送信する
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }

    /// ライターのバッファを書き出してから操作ログ件数を数える
    pub async fn activity_log_count(&self) -> i64 {
        self.writer.flush().await;
        sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// ライターのバッファを書き出してから操作ログを古い順に取得する
    pub async fn activity_logs(&self) -> Vec<(Option<String>, String, Option<String>)> {
        self.writer.flush().await;
        sqlx::query_as("SELECT user_id, action, description FROM activity_logs ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .unwrap()
    }
}
