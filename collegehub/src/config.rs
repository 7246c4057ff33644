//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to deprecated variable names with warning logs.

use std::path::PathBuf;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use collegehub::config::get_env_with_fallback;
///
/// let url = get_env_with_fallback("COLLEGEHUB_DATABASE_URL", "DATABASE_URL");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Default maximum request body size captured into an activity log description (1 MiB)
pub const DEFAULT_AUDIT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// 操作ログ記録の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// descriptionに取り込むリクエストボディの上限バイト数
    ///
    /// 超過したボディはハンドラーへはそのまま渡され、descriptionには含めない。
    pub max_body_bytes: usize,
    /// 標準のマスク対象に追加するフィールド名
    pub extra_redact_fields: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_AUDIT_MAX_BODY_BYTES,
            extra_redact_fields: Vec::new(),
        }
    }
}

impl AuditConfig {
    /// Load audit configuration from environment variables.
    pub fn from_env() -> Self {
        let max_body_bytes = get_env_with_fallback_parse(
            "COLLEGEHUB_AUDIT_MAX_BODY_BYTES",
            "AUDIT_MAX_BODY_BYTES",
            DEFAULT_AUDIT_MAX_BODY_BYTES,
        );
        let extra_redact_fields =
            get_env_with_fallback("COLLEGEHUB_AUDIT_REDACT_FIELDS", "AUDIT_REDACT_FIELDS")
                .map(|raw| parse_field_list(&raw))
                .unwrap_or_default();

        Self {
            max_body_bytes,
            extra_redact_fields,
        }
    }
}

fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// アクセスポリシーファイルのパスを取得
///
/// 環境変数 `COLLEGEHUB_POLICY_FILE`（旧: `POLICY_FILE`）。未設定なら組み込みの既定テーブルを使う。
pub fn get_policy_file() -> Option<PathBuf> {
    get_env_with_fallback("COLLEGEHUB_POLICY_FILE", "POLICY_FILE")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// データディレクトリを取得
///
/// `COLLEGEHUB_DATA_DIR` が未設定なら `~/.collegehub` を使う。
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = get_env_with_fallback("COLLEGEHUB_DATA_DIR", "DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".collegehub")
}

/// データベースURLを取得
///
/// 未設定なら `<data_dir>/collegehub.db` を使う。
pub fn get_database_url() -> String {
    get_env_with_fallback("COLLEGEHUB_DATABASE_URL", "DATABASE_URL").unwrap_or_else(|| {
        format!(
            "sqlite:{}",
            get_data_dir().join("collegehub.db").display()
        )
    })
}
