//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化

/// ユーザー・ロール割り当て管理
pub mod users;

/// データベースマイグレーション
pub mod migrations;

/// 操作ログストレージ
pub mod activity_log;

/// 汎用リソースレコード
pub mod resources;

/// Repository traitパターン（テスタビリティ向上）
pub mod traits;
