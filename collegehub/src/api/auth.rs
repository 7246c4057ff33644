//! 認証APIハンドラー
//!
//! `POST /api/auth/login`（公開）と `GET /api/auth/me`

use super::error::AppError;
use crate::auth::{jwt::create_jwt, password::verify_password};
use crate::common::auth::Principal;
use crate::common::error::HubError;
use crate::db::users;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// メールアドレス
    pub email: String,
    /// パスワード
    pub password: String,
}

/// ログインレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearerトークン
    pub token: String,
    /// ログインしたユーザー
    pub user: Principal,
}

/// ログイン
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || HubError::Authentication("Invalid email or password".to_string());

    let user = users::find_by_email(&state.db_pool, request.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&request.password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "Login failed: wrong password");
        return Err(invalid().into());
    }

    let principal = users::load_principal(&state.db_pool, user.id)
        .await?
        .ok_or_else(invalid)?;
    let token = create_jwt(&principal.id.to_string(), &state.jwt_secret)?;

    tracing::info!(user_id = %principal.id, "User logged in");
    Ok(Json(LoginResponse {
        token,
        user: principal,
    }))
}

/// ログイン中のユーザー
pub async fn me(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}
