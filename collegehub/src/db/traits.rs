//! Repository traitパターン定義
//!
//! 永続化先を抽象化し、ライターを任意のストレージに差し替えられるようにする。

use async_trait::async_trait;

use crate::audit::types::ActivityLogEntry;
use crate::common::error::HubResult;

/// 操作ログの書き込み先
///
/// `ActivityLogWriter`のバックグラウンドタスクが一括書き込みに使う。
#[async_trait]
pub trait ActivityLogSink: Send + Sync {
    /// エントリを一括挿入
    async fn insert_batch(&self, entries: &[ActivityLogEntry]) -> HubResult<()>;
}
