//! ロギング初期化
//!
//! 標準出力への人間向けログと、データディレクトリ配下の日次ローテートJSONログを出力する。
//! レベルは `COLLEGEHUB_LOG_LEVEL`（旧: `LOG_LEVEL`、既定: `info`）、
//! もしくは `RUST_LOG` で指定する。

use crate::config::{get_data_dir, get_env_with_fallback};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_FILE_PREFIX: &str = "collegehub.log";

/// ログファイルの出力ディレクトリ
///
/// `COLLEGEHUB_LOG_DIR` が未設定なら `<data_dir>/logs`。
pub fn log_dir() -> PathBuf {
    get_env_with_fallback("COLLEGEHUB_LOG_DIR", "LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| get_data_dir().join("logs"))
}

/// 当日のログファイルパス（`collegehub.log.YYYY-MM-DD`）
pub fn log_file_path() -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d");
    log_dir().join(format!("{}.{}", LOG_FILE_PREFIX, date))
}

fn env_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = get_env_with_fallback("COLLEGEHUB_LOG_LEVEL", "LOG_LEVEL")
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// グローバルサブスクライバを初期化
///
/// 戻り値のガードはプロセス終了まで保持すること（ドロップ時に未書き込みのログを出力する）。
pub fn init() -> anyhow::Result<WorkerGuard> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true))
        .with(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()?;

    Ok(guard)
}
