//! 操作ログAPIハンドラー
//!
//! `GET /api/activity-logs`（管理系グループ）

use super::error::AppError;
use super::pagination::Paginated;
use crate::audit::types::{ActivityLogFilter, ActivityLogRecord};
use crate::common::pagination::PageParams;
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

/// 操作ログ一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ActivityLogQueryParams {
    /// ページ番号（1始まり、デフォルト: 1）
    pub page: Option<i64>,
    /// ページあたり件数（デフォルト: 15）
    pub per_page: Option<i64>,
    /// ユーザーIDでフィルタ
    pub user_id: Option<Uuid>,
    /// action前方一致（例: `DELETE`）
    pub action: Option<String>,
}

impl From<ActivityLogQueryParams> for ActivityLogFilter {
    fn from(params: ActivityLogQueryParams) -> Self {
        Self {
            user_id: params.user_id,
            action_prefix: params.action,
            paging: PageParams::new(params.page, params.per_page),
        }
    }
}

/// 操作ログ一覧（新しい順）
pub async fn list_activity_logs(
    State(state): State<AppState>,
    Query(params): Query<ActivityLogQueryParams>,
) -> Result<Json<Paginated<ActivityLogRecord>>, AppError> {
    let filter = ActivityLogFilter::from(params);
    let records = state.activity_log_storage.query(&filter).await?;
    let total = state.activity_log_storage.count(&filter).await?;

    Ok(Json(Paginated::from_params(records, &filter.paging, total)))
}
