//! 初回起動時の管理者アカウント作成
//!
//! 環境変数から管理者を作成する

use crate::auth::password::hash_password;
use crate::common::auth::Role;
use crate::common::error::HubError;
use crate::config::get_env_with_fallback;
use crate::db;

/// 環境変数から管理者を作成
///
/// # Environment Variables
/// * `COLLEGEHUB_ADMIN_EMAIL` - 管理者メールアドレス（省略時: "admin@collegehub.local"）
/// * `COLLEGEHUB_ADMIN_PASSWORD` - 管理者パスワード（必須）
/// * `COLLEGEHUB_ADMIN_NAME` - 表示名（省略時: "Administrator"）
///
/// # Returns
/// * `Ok(Some(email))` - 管理者作成成功、または既存
/// * `Ok(None)` - パスワード未設定（作成しない）
pub async fn create_admin_from_env(pool: &sqlx::SqlitePool) -> Result<Option<String>, HubError> {
    let password = match get_env_with_fallback("COLLEGEHUB_ADMIN_PASSWORD", "ADMIN_PASSWORD") {
        Some(p) if !p.is_empty() => p,
        _ => {
            tracing::debug!("COLLEGEHUB_ADMIN_PASSWORD not set, skipping admin creation from env");
            return Ok(None);
        }
    };

    let email = get_env_with_fallback("COLLEGEHUB_ADMIN_EMAIL", "ADMIN_EMAIL")
        .unwrap_or_else(|| "admin@collegehub.local".to_string());
    let name = get_env_with_fallback("COLLEGEHUB_ADMIN_NAME", "ADMIN_NAME")
        .unwrap_or_else(|| "Administrator".to_string());

    let password_hash = hash_password(&password)?;

    match db::users::create(pool, &name, &email, &password_hash, None).await {
        Ok(user) => {
            db::users::assign_role(pool, user.id, Role::Admin).await?;
            tracing::info!("Created admin user from env: email={}", email);
            Ok(Some(user.email))
        }
        Err(HubError::Conflict(_)) => {
            tracing::warn!("Admin user {} already exists, skipping creation", email);
            Ok(Some(email))
        }
        Err(e) => {
            tracing::error!("Failed to create admin user from env: {}", e);
            Err(e)
        }
    }
}
