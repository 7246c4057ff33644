//! 操作ログストレージ

use crate::audit::types::{ActivityLogEntry, ActivityLogFilter, ActivityLogRecord, ActivityLogUser};
use crate::common::error::{HubError, HubResult};
use crate::db::traits::ActivityLogSink;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

/// 操作ログストレージ
///
/// 追記と参照のみを提供する（更新・削除APIは持たない）。
#[derive(Clone)]
pub struct ActivityLogStorage {
    pool: SqlitePool,
}

impl ActivityLogStorage {
    /// 新しいストレージを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// エントリを一括挿入
    ///
    /// まず1トランザクションでまとめて挿入する。失敗した場合は1件ずつ挿入し直し、
    /// 挿入できなかったエントリだけを警告ログに残して捨てる。
    /// 1件も保存できなかった場合のみエラーを返す。
    pub async fn insert_batch(&self, entries: &[ActivityLogEntry]) -> HubResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let batch_error = match self.insert_in_transaction(entries).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        if entries.len() == 1 {
            return Err(batch_error);
        }
        tracing::warn!(
            "Batch insert of {} activity log entries failed, retrying individually: {}",
            entries.len(),
            batch_error
        );

        let mut conn = self.pool.acquire().await.map_err(|e| {
            HubError::AuditPersistence(format!("Failed to acquire connection: {}", e))
        })?;
        let mut failed = 0usize;
        for entry in entries {
            if let Err(e) = insert_one(&mut *conn, entry).await {
                failed += 1;
                tracing::warn!(
                    action = %entry.action,
                    user_id = ?entry.user_id,
                    "Dropping activity log entry: {}",
                    e
                );
            }
        }

        if failed == entries.len() {
            return Err(HubError::AuditPersistence(format!(
                "All {} activity log entries failed to insert",
                failed
            )));
        }
        Ok(())
    }

    async fn insert_in_transaction(&self, entries: &[ActivityLogEntry]) -> HubResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| HubError::AuditPersistence(format!("Failed to begin transaction: {}", e)))?;

        for entry in entries {
            insert_one(&mut *tx, entry).await?;
        }

        tx.commit()
            .await
            .map_err(|e| HubError::AuditPersistence(format!("Failed to commit transaction: {}", e)))
    }

    /// フィルタ条件で操作ログを取得（新しい順、ユーザー情報を結合）
    pub async fn query(&self, filter: &ActivityLogFilter) -> HubResult<Vec<ActivityLogRecord>> {
        let (where_clause, binds) = build_where_clause(filter);

        let sql = format!(
            "SELECT l.id, l.user_id, l.action, l.description, l.ip_address, l.user_agent, \
             l.created_at, u.name AS user_name, u.email AS user_email \
             FROM activity_logs l LEFT JOIN users u ON u.id = l.user_id \
             {} ORDER BY l.created_at DESC, l.id DESC LIMIT ? OFFSET ?",
            where_clause
        );

        let mut query = sqlx::query_as::<_, ActivityLogRow>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        let rows = query
            .bind(filter.paging.per_page())
            .bind(filter.paging.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| HubError::Database(format!("Failed to query activity logs: {}", e)))?;

        rows.into_iter()
            .map(ActivityLogRecord::try_from)
            .collect::<Result<Vec<_>, _>>()
    }

    /// フィルタ条件に一致する件数
    pub async fn count(&self, filter: &ActivityLogFilter) -> HubResult<i64> {
        let (where_clause, binds) = build_where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM activity_logs l {}", where_clause);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }
        query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| HubError::Database(format!("Failed to count activity logs: {}", e)))
    }
}

#[async_trait]
impl ActivityLogSink for ActivityLogStorage {
    async fn insert_batch(&self, entries: &[ActivityLogEntry]) -> HubResult<()> {
        ActivityLogStorage::insert_batch(self, entries).await
    }
}

async fn insert_one(conn: &mut SqliteConnection, entry: &ActivityLogEntry) -> HubResult<()> {
    sqlx::query(
        r#"INSERT INTO activity_logs (
            user_id, action, description, ip_address, user_agent, created_at
        ) VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(entry.user_id.map(|id| id.to_string()))
    .bind(&entry.action)
    .bind(&entry.description)
    .bind(&entry.ip_address)
    .bind(&entry.user_agent)
    .bind(entry.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
    .execute(conn)
    .await
    .map_err(|e| HubError::AuditPersistence(format!("Failed to insert activity log: {}", e)))?;
    Ok(())
}

fn build_where_clause(filter: &ActivityLogFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(user_id) = filter.user_id {
        conditions.push("l.user_id = ?");
        binds.push(user_id.to_string());
    }
    if let Some(prefix) = filter.action_prefix.as_deref().filter(|p| !p.is_empty()) {
        conditions.push("l.action LIKE ? ESCAPE '\\'");
        binds.push(format!("{}%", escape_like(prefix)));
    }

    if conditions.is_empty() {
        (String::new(), binds)
    } else {
        (format!("WHERE {}", conditions.join(" AND ")), binds)
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[derive(sqlx::FromRow)]
struct ActivityLogRow {
    id: i64,
    user_id: Option<String>,
    action: String,
    description: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    created_at: String,
    user_name: Option<String>,
    user_email: Option<String>,
}

impl TryFrom<ActivityLogRow> for ActivityLogRecord {
    type Error = HubError;

    fn try_from(row: ActivityLogRow) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| HubError::Database(format!("Invalid created_at: {}", e)))?
            .with_timezone(&Utc);

        let user = match (row.user_id, row.user_name, row.user_email) {
            (Some(id), Some(name), Some(email)) => Some(ActivityLogUser {
                id: Uuid::parse_str(&id)
                    .map_err(|e| HubError::Database(format!("Invalid user id: {}", e)))?,
                name,
                email,
            }),
            _ => None,
        };

        Ok(ActivityLogRecord {
            id: row.id,
            user,
            action: row.action,
            description: row.description,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at,
        })
    }
}
