// 認証ミドルウェア実装

use crate::api::error::AppError;
use crate::common::error::HubError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, HubError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| HubError::Authentication("Missing Authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| HubError::Authentication("Invalid Authorization header format".to_string()))
}

/// JWT認証ミドルウェア
///
/// `Authorization: Bearer <jwt>` を検証し、subのユーザーをロール付きで解決して
/// `Principal`と`Claims`をrequest extensionsに格納する。
/// トークン不正・ユーザー不在は401。
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer_token(request.headers())
        .map_err(|e| AppError::from(e).into_response())?
        .to_string();

    let claims = crate::auth::jwt::verify_jwt(&token, &state.jwt_secret).map_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
        AppError::from(e).into_response()
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
        tracing::warn!("JWT subject is not a valid user id: {}", e);
        AppError::from(HubError::Authentication("Invalid token subject".to_string())).into_response()
    })?;

    let principal = crate::db::users::load_principal(&state.db_pool, user_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve principal {}: {}", user_id, e);
            AppError::from(e).into_response()
        })?
        .ok_or_else(|| {
            tracing::warn!("JWT refers to unknown user {}", user_id);
            AppError::from(HubError::Authentication("User not found".to_string())).into_response()
        })?;

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
