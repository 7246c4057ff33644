//! REST APIハンドラーとルーター構築
//!
//! ミドルウェアの順序（外側から）:
//! TraceLayer → JWT認証 → 操作ログ記録 → アクセスゲート（グループ単位） → ハンドラー

use crate::audit::middleware::activity_recorder_middleware;
use crate::auth::middleware::jwt_auth_middleware;
use crate::policy::gate::{access_gate_middleware, GateState};
use crate::policy::RouteGroup;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

/// 操作ログAPI
pub mod activity_logs;
/// 認証API
pub mod auth;
/// APIエラーレスポンス
pub mod error;
/// ページネーション
pub mod pagination;
/// 汎用リソースコントローラー
pub mod resources;

/// ルートグループ1つ分のルーター（ゲート付き）
fn group_router(state: &AppState, group: RouteGroup) -> Router<AppState> {
    let routes = match group {
        RouteGroup::ActivityLogs => Router::new().route(
            "/api/activity-logs",
            get(activity_logs::list_activity_logs),
        ),
        _ => {
            let collection = format!("/api/{}", group.slug());
            let item = format!("/api/{}/{{id}}", group.slug());
            Router::new()
                .route(&collection, get(resources::index).post(resources::store))
                .route(
                    &item,
                    get(resources::show)
                        .put(resources::update)
                        .patch(resources::patch)
                        .delete(resources::destroy),
                )
                .layer(Extension(group))
        }
    };

    routes.route_layer(middleware::from_fn_with_state(
        GateState::new(state.policy.clone(), group),
        access_gate_middleware,
    ))
}

/// アプリケーションのルーターを構築
pub fn create_app(state: AppState) -> Router {
    let mut protected = Router::new().route("/api/auth/me", get(auth::me));
    for group in RouteGroup::ALL {
        protected = protected.merge(group_router(&state, group));
    }

    let protected = protected
        .layer(middleware::from_fn_with_state(
            state.activity_recorder.clone(),
            activity_recorder_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
