//! リクエストパラメータのマスク処理
//!
//! 操作ログのdescriptionに書き出す前に、機密フィールドの値を置き換える。
//! キー名は大文字小文字を区別せず、ネストしたオブジェクトと配列も再帰的に処理する。

use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// マスク後の値
pub const REDACTED: &str = "[REDACTED]";

/// 標準のマスク対象フィールド
pub const DEFAULT_REDACT_FIELDS: [&str; 12] = [
    "password",
    "password_confirmation",
    "current_password",
    "new_password",
    "token",
    "access_token",
    "refresh_token",
    "api_key",
    "secret",
    "card_number",
    "cvv",
    "account_number",
];

/// フィールド名ベースのマスク処理
#[derive(Debug, Clone)]
pub struct Redactor {
    fields: BTreeSet<String>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl Redactor {
    /// 標準フィールドに`extra`を加えたRedactorを作成
    pub fn new(extra: &[String]) -> Self {
        let fields = DEFAULT_REDACT_FIELDS
            .iter()
            .map(|f| f.to_string())
            .chain(extra.iter().map(|f| f.trim().to_ascii_lowercase()))
            .filter(|f| !f.is_empty())
            .collect();
        Self { fields }
    }

    /// キーがマスク対象か
    pub fn is_sensitive(&self, key: &str) -> bool {
        self.fields.contains(&key.to_ascii_lowercase())
    }

    /// 値をマスクした複製を返す
    pub fn redact(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.redact_map(map)),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.redact(v)).collect()),
            other => other.clone(),
        }
    }

    /// オブジェクトをマスクした複製を返す
    pub fn redact_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .map(|(key, value)| {
                let value = if self.is_sensitive(key) {
                    Value::String(REDACTED.to_string())
                } else {
                    self.redact(value)
                };
                (key.clone(), value)
            })
            .collect()
    }
}
