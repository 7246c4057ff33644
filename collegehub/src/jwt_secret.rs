//! JWT秘密鍵の取得・生成
//!
//! 優先順位:
//! 1. 環境変数 `COLLEGEHUB_JWT_SECRET`（旧: `JWT_SECRET`）
//! 2. データディレクトリの `jwt_secret` ファイル
//! 3. 新規生成してファイルへ保存

use crate::auth::generate_random_token;
use crate::common::error::{CommonError, HubError};
use crate::config::{get_data_dir, get_env_with_fallback};
use std::fs;
use std::path::{Path, PathBuf};

/// 生成する秘密鍵の長さ（文字数）
pub const JWT_SECRET_LENGTH: usize = 64;

const SECRET_FILE_NAME: &str = "jwt_secret";

/// 秘密鍵ファイルのパス
pub fn secret_file_path() -> PathBuf {
    get_data_dir().join(SECRET_FILE_NAME)
}

/// JWT秘密鍵を取得、なければ生成して永続化
pub fn get_or_create_jwt_secret() -> Result<String, HubError> {
    if let Some(secret) = get_env_with_fallback("COLLEGEHUB_JWT_SECRET", "JWT_SECRET") {
        let secret = secret.trim().to_string();
        if !secret.is_empty() {
            tracing::debug!("Using JWT secret from environment");
            return Ok(secret);
        }
    }
    load_or_create_at(&secret_file_path())
}

/// 指定パスの秘密鍵を読み込む。存在しなければ生成して書き込む
pub fn load_or_create_at(path: &Path) -> Result<String, HubError> {
    if path.exists() {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(format!("Failed to read JWT secret {}: {}", path.display(), e))
        })?;
        let secret = content.trim().to_string();
        if !secret.is_empty() {
            return Ok(secret);
        }
        tracing::warn!("JWT secret file {} is empty, regenerating", path.display());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            config_error(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let secret = generate_random_token(JWT_SECRET_LENGTH);
    fs::write(path, &secret).map_err(|e| {
        config_error(format!("Failed to write JWT secret {}: {}", path.display(), e))
    })?;
    restrict_permissions(path);

    tracing::info!("Generated new JWT secret at {}", path.display());
    Ok(secret)
}

fn config_error(message: String) -> HubError {
    HubError::Common(CommonError::Config(message))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to restrict permissions on {}: {}", path.display(), e);
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
