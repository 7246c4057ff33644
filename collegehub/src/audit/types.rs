//! 操作ログの型定義

use crate::common::pagination::PageParams;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 操作ログエントリ（追記専用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// レコードID（DB挿入後に設定）
    pub id: Option<i64>,
    /// 操作したユーザーのID
    pub user_id: Option<Uuid>,
    /// `"{METHOD} {PATH}"` 形式の操作名（例: `"POST /api/students"`）
    pub action: String,
    /// マスク済みリクエストパラメータのJSON
    pub description: Option<String>,
    /// クライアントIPアドレス
    pub ip_address: Option<String>,
    /// User-Agentヘッダー
    pub user_agent: Option<String>,
    /// 記録日時
    pub created_at: DateTime<Utc>,
}

impl ActivityLogEntry {
    /// HTTPメソッドとパスからaction文字列を組み立てる
    pub fn action_for(method: &str, path: &str) -> String {
        format!("{} {}", method.to_ascii_uppercase(), path)
    }
}

/// 一覧表示用のユーザー概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogUser {
    /// ユーザーID
    pub id: Uuid,
    /// 氏名
    pub name: String,
    /// メールアドレス
    pub email: String,
}

/// 一覧表示用の操作ログ（ユーザー情報を結合済み）
///
/// ユーザーが削除済みの場合`user`は`None`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogRecord {
    /// レコードID
    pub id: i64,
    /// 操作したユーザー
    pub user: Option<ActivityLogUser>,
    /// 操作名
    pub action: String,
    /// マスク済みリクエストパラメータ
    pub description: Option<String>,
    /// クライアントIPアドレス
    pub ip_address: Option<String>,
    /// User-Agent
    pub user_agent: Option<String>,
    /// 記録日時
    pub created_at: DateTime<Utc>,
}

/// 操作ログフィルタ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityLogFilter {
    /// ユーザーIDでフィルタ
    pub user_id: Option<Uuid>,
    /// action前方一致でフィルタ（例: `"DELETE "`）
    pub action_prefix: Option<String>,
    /// ページ指定
    pub paging: PageParams,
}
