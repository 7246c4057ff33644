//! 共通型定義

/// 認証関連のデータモデル（Role, Principal, Claims）
pub mod auth;

/// 統一エラー型
pub mod error;

/// IPアドレス正規化
pub mod ip;

/// ページ指定
pub mod pagination;
