//! 認証関連のデータモデル

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ユーザーロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 管理者（全操作可能）
    Admin,
    /// 教職員
    Staff,
    /// 学生
    Student,
}

impl Role {
    /// すべてのロール
    pub const ALL: [Role; 3] = [Role::Admin, Role::Staff, Role::Student];

    /// ロールを文字列に変換（DB保存形式）
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Student => "student",
        }
    }

    /// 文字列からロールに変換
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            "student" => Some(Self::Student),
            _ => None,
        }
    }

    /// 拒否メッセージに使う複数形ラベル
    pub fn plural_label(&self) -> &'static str {
        match self {
            Self::Admin => "Admins",
            Self::Staff => "Staff",
            Self::Student => "Students",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown role: {}", s))
    }
}

/// ユーザー（DB行）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// ユーザーID
    pub id: Uuid,
    /// 氏名
    pub name: String,
    /// メールアドレス（ログインID）
    pub email: String,
    /// パスワードハッシュ（bcrypt）
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// 所属学科ID
    pub department_id: Option<i64>,
    /// 作成日時
    pub created_at: DateTime<Utc>,
}

/// 認証済みの呼び出し元
///
/// 認証ミドルウェアがリクエストごとに解決し、request extensionsに格納する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// ユーザーID
    pub id: Uuid,
    /// 氏名
    pub name: String,
    /// メールアドレス
    pub email: String,
    /// 割り当て済みロール
    pub roles: Vec<Role>,
    /// 所属学科ID
    pub department_id: Option<i64>,
}

impl Principal {
    /// 指定ロールを保持しているか
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Userと割り当てロールからPrincipalを構築
    pub fn from_user(user: User, mut roles: Vec<Role>) -> Self {
        roles.sort();
        roles.dedup();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            roles,
            department_id: user.department_id,
        }
    }
}

/// JWTクレーム
///
/// ロールはトークンに含めず、リクエストごとにDBから解決する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// ユーザーID（JWT sub claim）
    pub sub: String,
    /// 有効期限（Unix timestamp、JWT exp claim）
    pub exp: usize,
}
