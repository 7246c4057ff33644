//! College Hub Server
//!
//! 学科・職員・学生・出欠などを管理するカレッジ管理バックエンド。
//! ロール別のアクセスゲートと操作ログ記録を全APIに適用する。

#![warn(missing_docs)]

/// 共通型定義（ロール・プリンシパル・エラー）
pub mod common;

/// REST APIハンドラー
pub mod api;

/// 操作ログ（アクティビティログ）記録
pub mod audit;

/// 認証機能（JWT・パスワード・初期管理者）
pub mod auth;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// データベースアクセス
pub mod db;

/// JWT秘密鍵管理
pub mod jwt_secret;

/// ロギング初期化ユーティリティ
pub mod logging;

/// ロール別アクセスポリシー
pub mod policy;

/// HTTPサーバー起動・シャットダウン
pub mod server;

use audit::middleware::ActivityRecorder;
use audit::writer::{ActivityLogWriter, ActivityLogWriterConfig};
use config::AuditConfig;
use db::activity_log::ActivityLogStorage;
use policy::AccessPolicy;
use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// JWT署名用シークレット
    pub jwt_secret: String,
    /// ロール別アクセスポリシー
    pub policy: Arc<AccessPolicy>,
    /// 操作ログレコーダー
    pub activity_recorder: ActivityRecorder,
    /// 操作ログの読み出し用ストレージ
    pub activity_log_storage: ActivityLogStorage,
}

impl AppState {
    /// SQLiteを書き込み先とする操作ログライターを起動してアプリケーション状態を作成
    ///
    /// ライターのバックグラウンドタスクを起動するため、Tokioランタイム内で呼ぶこと。
    pub fn new(
        db_pool: sqlx::SqlitePool,
        jwt_secret: String,
        policy: AccessPolicy,
        audit_config: &AuditConfig,
        writer_config: ActivityLogWriterConfig,
    ) -> Self {
        let activity_log_storage = ActivityLogStorage::new(db_pool.clone());
        let writer = ActivityLogWriter::new(Arc::new(activity_log_storage.clone()), writer_config);
        Self::with_writer(db_pool, jwt_secret, policy, audit_config, writer)
    }

    /// 既存のライターを使ってアプリケーション状態を作成
    pub fn with_writer(
        db_pool: sqlx::SqlitePool,
        jwt_secret: String,
        policy: AccessPolicy,
        audit_config: &AuditConfig,
        writer: ActivityLogWriter,
    ) -> Self {
        Self {
            activity_log_storage: ActivityLogStorage::new(db_pool.clone()),
            db_pool,
            jwt_secret,
            policy: Arc::new(policy),
            activity_recorder: ActivityRecorder::new(writer, audit_config),
        }
    }
}
