//! ユーザーCRUD操作とロール解決

use crate::common::auth::{Principal, Role, User};
use crate::common::error::HubError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// ユーザーを作成
///
/// # Returns
/// * `Ok(User)` - 作成されたユーザー
/// * `Err(HubError)` - 作成失敗（メールアドレス重複など）
pub async fn create(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    department_id: Option<i64>,
) -> Result<User, HubError> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, department_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(department_id)
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            HubError::Conflict(format!("Email '{}' already exists", email))
        } else {
            HubError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        department_id,
        created_at,
    })
}

/// ユーザーにロールを割り当てる（既に保持していれば何もしない）
pub async fn assign_role(pool: &SqlitePool, user_id: Uuid, role: Role) -> Result<(), HubError> {
    sqlx::query("INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?, ?)")
        .bind(user_id.to_string())
        .bind(role.as_str())
        .execute(pool)
        .await
        .map_err(|e| HubError::Database(format!("Failed to assign role: {}", e)))?;
    Ok(())
}

/// ユーザーからロールを外す
pub async fn revoke_role(pool: &SqlitePool, user_id: Uuid, role: Role) -> Result<bool, HubError> {
    let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role = ?")
        .bind(user_id.to_string())
        .bind(role.as_str())
        .execute(pool)
        .await
        .map_err(|e| HubError::Database(format!("Failed to revoke role: {}", e)))?;
    Ok(result.rows_affected() > 0)
}

/// ユーザーの保持ロールを取得
///
/// 未知のロール文字列は無視する。
pub async fn roles_for(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Role>, HubError> {
    let names: Vec<String> =
        sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ? ORDER BY role")
            .bind(user_id.to_string())
            .fetch_all(pool)
            .await
            .map_err(|e| HubError::Database(format!("Failed to load roles: {}", e)))?;

    Ok(names.iter().filter_map(|name| Role::parse(name)).collect())
}

/// メールアドレスでユーザーを検索
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, HubError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, password_hash, department_id, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| HubError::Database(format!("Failed to find user: {}", e)))?;

    row.map(User::try_from).transpose()
}

/// IDでユーザーを検索
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, HubError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, password_hash, department_id, created_at FROM users WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| HubError::Database(format!("Failed to find user: {}", e)))?;

    row.map(User::try_from).transpose()
}

/// ユーザーIDからロール付きのPrincipalを解決する
///
/// 認証ミドルウェアとログインAPIが共有するロール解決処理。
/// ユーザーが存在しなければ`Ok(None)`。
pub async fn load_principal(pool: &SqlitePool, id: Uuid) -> Result<Option<Principal>, HubError> {
    let Some(user) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let roles = roles_for(pool, user.id).await?;
    Ok(Some(Principal::from_user(user, roles)))
}

/// 管理者ロールを持つユーザーが存在するか
pub async fn admin_exists(pool: &SqlitePool) -> Result<bool, HubError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role = 'admin'")
        .fetch_one(pool)
        .await
        .map_err(|e| HubError::Database(format!("Failed to count admins: {}", e)))?;
    Ok(count > 0)
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    department_id: Option<i64>,
    created_at: String,
}

impl TryFrom<UserRow> for User {
    type Error = HubError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| HubError::Database(format!("Invalid user id '{}': {}", row.id, e)))?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| HubError::Database(format!("Invalid created_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(User {
            id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            department_id: row.department_id,
            created_at,
        })
    }
}
