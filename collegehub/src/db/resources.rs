//! 汎用リソースレコードのCRUD
//!
//! 学生・出欠・成績などの各ドメインのレコードを、リソース名とJSONペイロードの組として保存する。

use crate::common::error::{HubError, HubResult};
use crate::common::pagination::PageParams;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::SqlitePool;

/// リソースレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// レコードID
    pub id: i64,
    /// ペイロード（トップレベルに展開して返す）
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 更新日時
    pub updated_at: DateTime<Utc>,
}

const RESERVED_KEYS: [&str; 3] = ["id", "created_at", "updated_at"];

fn sanitize(mut payload: Map<String, Value>) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        payload.remove(key);
    }
    payload
}

fn now_string(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// レコードを作成
pub async fn create(
    pool: &SqlitePool,
    resource: &str,
    payload: Map<String, Value>,
) -> HubResult<ResourceRecord> {
    let payload = sanitize(payload);
    let now = Utc::now();
    let encoded = serde_json::to_string(&payload).map_err(crate::common::error::CommonError::from)?;

    let result = sqlx::query(
        "INSERT INTO resource_records (resource, payload, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(resource)
    .bind(&encoded)
    .bind(now_string(now))
    .bind(now_string(now))
    .execute(pool)
    .await
    .map_err(|e| HubError::Database(format!("Failed to create {} record: {}", resource, e)))?;

    Ok(ResourceRecord {
        id: result.last_insert_rowid(),
        payload,
        created_at: now,
        updated_at: now,
    })
}

/// レコード一覧（ID昇順）
pub async fn list(
    pool: &SqlitePool,
    resource: &str,
    params: &PageParams,
) -> HubResult<Vec<ResourceRecord>> {
    let rows = sqlx::query_as::<_, ResourceRow>(
        "SELECT id, payload, created_at, updated_at FROM resource_records \
         WHERE resource = ? ORDER BY id ASC LIMIT ? OFFSET ?",
    )
    .bind(resource)
    .bind(params.per_page())
    .bind(params.offset())
    .fetch_all(pool)
    .await
    .map_err(|e| HubError::Database(format!("Failed to list {} records: {}", resource, e)))?;

    rows.into_iter()
        .map(ResourceRecord::try_from)
        .collect::<Result<Vec<_>, _>>()
}

/// レコード件数
pub async fn count(pool: &SqlitePool, resource: &str) -> HubResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM resource_records WHERE resource = ?")
        .bind(resource)
        .fetch_one(pool)
        .await
        .map_err(|e| HubError::Database(format!("Failed to count {} records: {}", resource, e)))
}

/// IDでレコードを取得
pub async fn find(pool: &SqlitePool, resource: &str, id: i64) -> HubResult<Option<ResourceRecord>> {
    let row = sqlx::query_as::<_, ResourceRow>(
        "SELECT id, payload, created_at, updated_at FROM resource_records WHERE resource = ? AND id = ?",
    )
    .bind(resource)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| HubError::Database(format!("Failed to find {} record: {}", resource, e)))?;

    row.map(ResourceRecord::try_from).transpose()
}

/// レコードを更新
///
/// `merge`がtrueなら既存ペイロードにキー単位でマージ（PATCH）、falseなら置き換え（PUT）。
/// 対象が存在しなければ`Ok(None)`。
pub async fn update(
    pool: &SqlitePool,
    resource: &str,
    id: i64,
    payload: Map<String, Value>,
    merge: bool,
) -> HubResult<Option<ResourceRecord>> {
    let Some(current) = find(pool, resource, id).await? else {
        return Ok(None);
    };

    let payload = sanitize(payload);
    let next_payload = if merge {
        let mut merged = current.payload;
        merged.extend(payload);
        merged
    } else {
        payload
    };
    let now = Utc::now();
    let encoded =
        serde_json::to_string(&next_payload).map_err(crate::common::error::CommonError::from)?;

    sqlx::query(
        "UPDATE resource_records SET payload = ?, updated_at = ? WHERE resource = ? AND id = ?",
    )
    .bind(&encoded)
    .bind(now_string(now))
    .bind(resource)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| HubError::Database(format!("Failed to update {} record: {}", resource, e)))?;

    Ok(Some(ResourceRecord {
        id,
        payload: next_payload,
        created_at: current.created_at,
        updated_at: now,
    }))
}

/// レコードを削除
pub async fn delete(pool: &SqlitePool, resource: &str, id: i64) -> HubResult<bool> {
    let result = sqlx::query("DELETE FROM resource_records WHERE resource = ? AND id = ?")
        .bind(resource)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| HubError::Database(format!("Failed to delete {} record: {}", resource, e)))?;
    Ok(result.rows_affected() > 0)
}

#[derive(sqlx::FromRow)]
struct ResourceRow {
    id: i64,
    payload: String,
    created_at: String,
    updated_at: String,
}

fn parse_timestamp(raw: &str) -> HubResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HubError::Database(format!("Invalid timestamp '{}': {}", raw, e)))
}

impl TryFrom<ResourceRow> for ResourceRecord {
    type Error = HubError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        let payload = match serde_json::from_str::<Value>(&row.payload)
            .map_err(|e| HubError::Database(format!("Corrupt payload for record {}: {}", row.id, e)))?
        {
            Value::Object(map) => map,
            other => {
                return Err(HubError::Database(format!(
                    "Record {} payload is not an object: {}",
                    row.id, other
                )))
            }
        };

        Ok(ResourceRecord {
            id: row.id,
            payload,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}
