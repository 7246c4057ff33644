//! 汎用リソースコントローラー
//!
//! 各ルートグループの `GET/POST /api/{group}` と `GET/PUT/PATCH/DELETE /api/{group}/{id}`。
//! 対象グループはルーター側で`Extension<RouteGroup>`として渡される。

use super::error::AppError;
use super::pagination::Paginated;
use crate::common::error::HubError;
use crate::common::pagination::PageParams;
use crate::db::resources::{self, ResourceRecord};
use crate::policy::RouteGroup;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Map, Value};

fn not_found(group: RouteGroup, id: i64) -> AppError {
    AppError(HubError::NotFound(format!("{} record {}", group, id)))
}

/// 一覧
pub async fn index(
    State(state): State<AppState>,
    Extension(group): Extension<RouteGroup>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<ResourceRecord>>, AppError> {
    let records = resources::list(&state.db_pool, group.slug(), &params).await?;
    let total = resources::count(&state.db_pool, group.slug()).await?;
    Ok(Json(Paginated::from_params(records, &params, total)))
}

/// 作成
pub async fn store(
    State(state): State<AppState>,
    Extension(group): Extension<RouteGroup>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<ResourceRecord>), AppError> {
    let record = resources::create(&state.db_pool, group.slug(), payload).await?;
    tracing::debug!(group = %group, id = record.id, "Created record");
    Ok((StatusCode::CREATED, Json(record)))
}

/// 詳細
pub async fn show(
    State(state): State<AppState>,
    Extension(group): Extension<RouteGroup>,
    Path(id): Path<i64>,
) -> Result<Json<ResourceRecord>, AppError> {
    resources::find(&state.db_pool, group.slug(), id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(group, id))
}

/// 置き換え（PUT）
pub async fn update(
    State(state): State<AppState>,
    Extension(group): Extension<RouteGroup>,
    Path(id): Path<i64>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<ResourceRecord>, AppError> {
    resources::update(&state.db_pool, group.slug(), id, payload, false)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(group, id))
}

/// 部分更新（PATCH）
pub async fn patch(
    State(state): State<AppState>,
    Extension(group): Extension<RouteGroup>,
    Path(id): Path<i64>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<ResourceRecord>, AppError> {
    resources::update(&state.db_pool, group.slug(), id, payload, true)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(group, id))
}

/// 削除
pub async fn destroy(
    State(state): State<AppState>,
    Extension(group): Extension<RouteGroup>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    if !resources::delete(&state.db_pool, group.slug(), id).await? {
        return Err(not_found(group, id));
    }
    tracing::debug!(group = %group, id, "Deleted record");
    Ok(Json(json!({ "message": "Deleted successfully." })))
}
