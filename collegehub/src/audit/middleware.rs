//! 操作ログ記録ミドルウェア
//!
//! 認証済みユーザーの変更系リクエストを、ハンドラー実行後に記録する。
//! 記録はライターへの非同期送信のみで、レスポンスには手を加えない。
//! ボディが `max_body_bytes` を超える場合のみ、ハンドラーを呼ばずに413を返す。

use crate::api::error::AppError;
use crate::audit::redact::Redactor;
use crate::audit::types::ActivityLogEntry;
use crate::audit::writer::ActivityLogWriter;
use crate::common::auth::Principal;
use crate::common::error::HubError;
use crate::common::ip::client_ip;
use crate::config::AuditConfig;
use crate::policy::gate::AccessDenied;
use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request, State},
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use http_body::{Body as _, Frame};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// 操作ログレコーダーの状態
#[derive(Clone)]
pub struct ActivityRecorder {
    writer: ActivityLogWriter,
    redactor: Arc<Redactor>,
    max_body_bytes: usize,
}

impl ActivityRecorder {
    /// 新しいレコーダーを作成
    pub fn new(writer: ActivityLogWriter, config: &AuditConfig) -> Self {
        Self {
            writer,
            redactor: Arc::new(Redactor::new(&config.extra_redact_fields)),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// 書き込み先のライター
    pub fn writer(&self) -> &ActivityLogWriter {
        &self.writer
    }

    /// リクエストパラメータからdescriptionを組み立てる
    ///
    /// クエリ文字列とJSON/フォームボディをマージし（同名キーはボディ優先）、
    /// マスク後のJSONオブジェクトとして直列化する。
    pub fn describe(&self, query: Option<&str>, content_type: Option<&str>, body: &[u8]) -> String {
        let mut params = Map::new();
        if let Some(query) = query {
            merge_urlencoded(&mut params, query.as_bytes());
        }
        if !body.is_empty() {
            merge_body(&mut params, content_type, body);
        }
        Value::Object(self.redactor.redact_map(&params)).to_string()
    }

    /// ボディを上限まで読み取り、同じ内容でリクエストを再構築する
    ///
    /// 長さ不明（chunked等）のボディも読み取る。上限を超えたら413を返す。
    /// 読み取り中のストリームエラーは、同じエラーを返すボディに差し替えて
    /// ハンドラーへ渡す（descriptionにはボディを含めない）。
    async fn capture_body(&self, request: Request) -> Result<(Request, Option<Bytes>), Response> {
        let limit = self.max_body_bytes;
        if request.body().size_hint().lower() > limit as u64 {
            return Err(payload_too_large(limit));
        }

        let (parts, body) = request.into_parts();
        match axum::body::to_bytes(body, limit).await {
            Ok(bytes) => Ok((
                Request::from_parts(parts, Body::from(bytes.clone())),
                Some(bytes),
            )),
            Err(e) => {
                let inner = e.into_inner();
                if is_length_limit(&*inner) {
                    return Err(payload_too_large(limit));
                }
                tracing::warn!("Failed to read request body for activity log: {}", inner);
                let body = Body::new(FailedBody(Some(axum::Error::new(inner))));
                Ok((Request::from_parts(parts, body), None))
            }
        }
    }
}

fn payload_too_large(limit: usize) -> Response {
    AppError(HubError::PayloadTooLarge(format!(
        "Request body exceeds {} bytes",
        limit
    )))
    .into_response()
}

fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// 読み取りに失敗したボディの代わりに、同じエラーを一度だけ返すボディ
struct FailedBody(Option<axum::Error>);

impl http_body::Body for FailedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, Self::Error>>> {
        Poll::Ready(self.0.take().map(Err))
    }
}

fn merge_urlencoded(params: &mut Map<String, Value>, raw: &[u8]) {
    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(raw) {
        Ok(pairs) => {
            for (key, value) in pairs {
                params.insert(key, Value::String(value));
            }
        }
        Err(e) => tracing::debug!("Ignoring unparsable urlencoded parameters: {}", e),
    }
}

fn merge_body(params: &mut Map<String, Value>, content_type: Option<&str>, body: &[u8]) {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if mime == "application/x-www-form-urlencoded" {
        merge_urlencoded(params, body);
        return;
    }
    if mime == "application/json" || mime.ends_with("+json") || mime.is_empty() {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => params.extend(map),
            Ok(_) => tracing::debug!("Non-object JSON body is not included in activity log"),
            Err(e) => tracing::debug!("Ignoring unparsable JSON body: {}", e),
        }
    }
}

/// 記録対象のメソッドか
pub fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// 操作ログ記録ミドルウェア
///
/// 記録条件:
/// - メソッドがPOST/PUT/PATCH/DELETE
/// - Principalが解決済み
/// - アクセスゲートで拒否されていない
///
/// ハンドラーのステータスコードは問わない。
pub async fn activity_recorder_middleware(
    State(recorder): State<ActivityRecorder>,
    request: Request,
    next: Next,
) -> Response {
    if !is_mutating(request.method()) {
        return next.run(request).await;
    }
    let Some(principal) = request.extensions().get::<Principal>().cloned() else {
        return next.run(request).await;
    };

    let action = ActivityLogEntry::action_for(request.method().as_str(), request.uri().path());
    let query = request.uri().query().map(str::to_string);
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip_address = client_ip(request.headers(), peer.as_ref());
    let user_agent = header_string(&request, header::USER_AGENT);
    let content_type = header_string(&request, header::CONTENT_TYPE);

    let (request, body) = match recorder.capture_body(request).await {
        Ok(captured) => captured,
        Err(response) => return response,
    };

    let response = next.run(request).await;

    if response.extensions().get::<AccessDenied>().is_some() {
        return response;
    }

    let description = recorder.describe(
        query.as_deref(),
        content_type.as_deref(),
        body.as_deref().unwrap_or_default(),
    );

    recorder.writer.send(ActivityLogEntry {
        id: None,
        user_id: Some(principal.id),
        action,
        description: Some(description),
        ip_address,
        user_agent,
        created_at: Utc::now(),
    });

    response
}

fn header_string(request: &Request, name: header::HeaderName) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
