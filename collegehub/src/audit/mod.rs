//! 操作ログシステム
//!
//! 認証済みユーザーによる変更系リクエスト（POST/PUT/PATCH/DELETE）を記録する

/// 操作ログの型定義
pub mod types;

/// リクエストパラメータのマスク処理
pub mod redact;

/// 非同期バッファライター
pub mod writer;

/// 操作ログ記録ミドルウェア
pub mod middleware;
