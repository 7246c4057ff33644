//! アクセスゲートミドルウェア
//!
//! ルートグループ単位で`route_layer`として装着し、ハンドラーの手前で判定する。
//! 拒否時はハンドラーを呼ばずに403を返す。

use super::{AccessPolicy, Decision, RouteGroup};
use crate::common::auth::{Principal, Role};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// ゲートの状態（ポリシーと対象グループ）
#[derive(Clone)]
pub struct GateState {
    /// 共有ポリシーテーブル
    pub policy: Arc<AccessPolicy>,
    /// このゲートが守るルートグループ
    pub group: RouteGroup,
}

impl GateState {
    /// 新しいゲート状態を作成
    pub fn new(policy: Arc<AccessPolicy>, group: RouteGroup) -> Self {
        Self { policy, group }
    }
}

/// ゲートが拒否したレスポンスに付与するマーカー
///
/// 操作ログミドルウェアはこのマーカーを持つレスポンスを記録しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDenied {
    /// 拒否されたグループ
    pub group: RouteGroup,
    /// 拒否理由となったロール
    pub role: Role,
}

/// 拒否メッセージ
///
/// staffの場合 `"Unauthorized. Staff do not have access to this resource."`
pub fn denial_message(role: Role) -> String {
    format!(
        "Unauthorized. {} do not have access to this resource.",
        role.plural_label()
    )
}

/// 拒否レスポンスを生成（403 + マーカー付き）
pub fn denial_response(role: Role, group: RouteGroup) -> Response {
    let mut response = (
        StatusCode::FORBIDDEN,
        Json(json!({ "message": denial_message(role) })),
    )
        .into_response();
    response
        .extensions_mut()
        .insert(AccessDenied { group, role });
    response
}

/// アクセスゲートミドルウェア
///
/// Principalが未解決のリクエストは判定せずに通す（認証は上流で拒否される）。
pub async fn access_gate_middleware(
    State(gate): State<GateState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(principal) = request.extensions().get::<Principal>() else {
        return next.run(request).await;
    };

    match gate.policy.decide(principal, gate.group) {
        Decision::Allow => next.run(request).await,
        Decision::Deny(role) => {
            tracing::warn!(
                user_id = %principal.id,
                role = %role,
                group = %gate.group,
                method = %request.method(),
                path = %request.uri().path(),
                "Access denied by role policy"
            );
            denial_response(role, gate.group)
        }
    }
}
