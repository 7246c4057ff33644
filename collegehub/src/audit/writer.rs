//! 操作ログの非同期バッファライター
//!
//! mpscチャネルでエントリを受信し、定期的にストレージへ一括書き込みする。
//! 書き込み失敗はログに残すのみで、リクエストのレスポンスには影響しない。

use crate::audit::types::ActivityLogEntry;
use crate::config::get_env_with_fallback_parse;
use crate::db::traits::ActivityLogSink;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// 操作ログライター設定
#[derive(Debug, Clone)]
pub struct ActivityLogWriterConfig {
    /// フラッシュ間隔（秒）。デフォルト: 2
    pub flush_interval_secs: u64,
    /// バッファ上限エントリ数。デフォルト: 10000
    pub buffer_capacity: usize,
}

impl Default for ActivityLogWriterConfig {
    fn default() -> Self {
        Self {
            flush_interval_secs: get_env_with_fallback_parse(
                "COLLEGEHUB_AUDIT_FLUSH_INTERVAL_SECS",
                "AUDIT_FLUSH_INTERVAL_SECS",
                2,
            ),
            buffer_capacity: get_env_with_fallback_parse(
                "COLLEGEHUB_AUDIT_BUFFER_CAPACITY",
                "AUDIT_BUFFER_CAPACITY",
                10_000,
            ),
        }
    }
}

enum WriterMessage {
    Entry(ActivityLogEntry),
    Flush(oneshot::Sender<()>),
}

/// 操作ログの非同期ライター
///
/// Clone可能（senderのクローン）。
#[derive(Clone)]
pub struct ActivityLogWriter {
    sender: mpsc::Sender<WriterMessage>,
}

impl ActivityLogWriter {
    /// 新しいActivityLogWriterを作成し、バックグラウンドタスクを起動
    pub fn new(sink: Arc<dyn ActivityLogSink>, config: ActivityLogWriterConfig) -> Self {
        let capacity = config.buffer_capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);

        tokio::spawn(Self::background_task(rx, sink, config));

        Self { sender: tx }
    }

    /// エントリをバッファに送信（非同期、ブロックしない）
    ///
    /// チャネル満杯・クローズ時はエントリを破棄して警告を出す。
    pub fn send(&self, entry: ActivityLogEntry) {
        if let Err(e) = self.sender.try_send(WriterMessage::Entry(entry)) {
            let action = match &e {
                mpsc::error::TrySendError::Full(WriterMessage::Entry(entry))
                | mpsc::error::TrySendError::Closed(WriterMessage::Entry(entry)) => {
                    entry.action.as_str()
                }
                _ => "",
            };
            warn!(action, "Failed to send activity log entry: {}", e);
        }
    }

    /// バッファ済みのエントリを即時に書き込み、完了まで待つ
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.sender.send(WriterMessage::Flush(tx)).await.is_err() {
            debug!("Activity log writer already stopped, nothing to flush");
            return;
        }
        if rx.await.is_err() {
            warn!("Activity log writer stopped before acknowledging flush");
        }
    }

    /// バックグラウンドフラッシュタスク
    async fn background_task(
        mut rx: mpsc::Receiver<WriterMessage>,
        sink: Arc<dyn ActivityLogSink>,
        config: ActivityLogWriterConfig,
    ) {
        let capacity = config.buffer_capacity.max(1);
        let mut buffer = VecDeque::with_capacity(capacity.min(1024));
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(
            config.flush_interval_secs.max(1),
        ));
        // 最初のtickはすぐに発火するのでスキップ
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if !buffer.is_empty() {
                        Self::flush_buffer(&mut buffer, sink.as_ref()).await;
                    }
                }
                message = rx.recv() => {
                    match message {
                        Some(WriterMessage::Entry(entry)) => {
                            if buffer.len() >= capacity {
                                let discarded = buffer.pop_front();
                                warn!(
                                    "Activity log buffer overflow (capacity: {}), discarding oldest entry: {:?}",
                                    capacity,
                                    discarded.map(|e: ActivityLogEntry| e.action)
                                );
                            }
                            buffer.push_back(entry);
                        }
                        Some(WriterMessage::Flush(ack)) => {
                            if !buffer.is_empty() {
                                Self::flush_buffer(&mut buffer, sink.as_ref()).await;
                            }
                            let _ = ack.send(());
                        }
                        None => {
                            // チャネルが閉じられた → 残りをフラッシュして終了
                            if !buffer.is_empty() {
                                info!("Activity log writer shutting down, flushing {} remaining entries", buffer.len());
                                Self::flush_buffer(&mut buffer, sink.as_ref()).await;
                            }
                            info!("Activity log writer background task stopped");
                            return;
                        }
                    }
                }
            }
        }
    }

    /// バッファ内エントリを一括書き込み
    async fn flush_buffer(buffer: &mut VecDeque<ActivityLogEntry>, sink: &dyn ActivityLogSink) {
        let entries: Vec<ActivityLogEntry> = buffer.drain(..).collect();
        let count = entries.len();

        if let Err(e) = sink.insert_batch(&entries).await {
            warn!(
                "Failed to flush activity log entries: {}. {} entries lost.",
                e, count
            );
            return;
        }

        debug!("Flushed {} activity log entries", count);
    }
}
