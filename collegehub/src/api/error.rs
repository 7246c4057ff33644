//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use crate::common::error::HubError;
use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Axum用のエラーレスポンス型
///
/// 本文は `{"message": ...}`。内部詳細は`external_message()`で伏せる。
#[derive(Debug)]
pub struct AppError(pub HubError);

impl From<HubError> for AppError {
    fn from(err: HubError) -> Self {
        AppError(err)
    }
}

impl From<crate::common::error::CommonError> for AppError {
    fn from(err: crate::common::error::CommonError) -> Self {
        AppError(HubError::Common(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let payload = json!({
            "message": self.0.external_message()
        });

        (status, Json(payload)).into_response()
    }
}
