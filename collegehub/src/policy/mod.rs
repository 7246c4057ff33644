//! ロール別アクセスポリシー
//!
//! ルートグループごとの拒否テーブルを一箇所で保持する。
//! 各ルートは自分の[`RouteGroup`]だけを宣言し、制限の有無はこのテーブルが決める。
//!
//! 評価規則:
//! 1. `admin`を保持していれば常に許可（他ロールより優先）
//! 2. それ以外で、保持ロールのいずれかがグループを拒否していれば拒否
//! 3. それ以外は許可

use crate::common::auth::{Principal, Role};
use crate::common::error::{CommonError, HubError, HubResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// アクセスゲート
pub mod gate;

/// ルートグループ
///
/// `/api/{slug}` 配下のルートをまとめる単位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteGroup {
    /// 学科
    Departments,
    /// 教職員
    Staff,
    /// 学費
    Fees,
    /// 操作ログ
    ActivityLogs,
    /// 学年度
    AcademicYears,
    /// バックアップ
    Backups,
    /// 学生
    Students,
    /// 出欠
    Attendance,
    /// 成績
    Marks,
    /// 科目
    Subjects,
    /// お知らせ
    Notifications,
    /// 休暇申請
    Leaves,
    /// 図書館
    Library,
    /// 寮
    Hostel,
    /// 通学バス
    Transport,
    /// 時間割
    Timetable,
}

impl RouteGroup {
    /// すべてのルートグループ
    pub const ALL: [RouteGroup; 16] = [
        RouteGroup::Departments,
        RouteGroup::Staff,
        RouteGroup::Fees,
        RouteGroup::ActivityLogs,
        RouteGroup::AcademicYears,
        RouteGroup::Backups,
        RouteGroup::Students,
        RouteGroup::Attendance,
        RouteGroup::Marks,
        RouteGroup::Subjects,
        RouteGroup::Notifications,
        RouteGroup::Leaves,
        RouteGroup::Library,
        RouteGroup::Hostel,
        RouteGroup::Transport,
        RouteGroup::Timetable,
    ];

    /// 管理系グループ（既定でstaffを拒否する）
    pub const ADMINISTRATIVE: [RouteGroup; 6] = [
        RouteGroup::Departments,
        RouteGroup::Staff,
        RouteGroup::Fees,
        RouteGroup::ActivityLogs,
        RouteGroup::AcademicYears,
        RouteGroup::Backups,
    ];

    /// URLパス上の名前
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Departments => "departments",
            Self::Staff => "staff",
            Self::Fees => "fees",
            Self::ActivityLogs => "activity-logs",
            Self::AcademicYears => "academic-years",
            Self::Backups => "backups",
            Self::Students => "students",
            Self::Attendance => "attendance",
            Self::Marks => "marks",
            Self::Subjects => "subjects",
            Self::Notifications => "notifications",
            Self::Leaves => "leaves",
            Self::Library => "library",
            Self::Hostel => "hostel",
            Self::Transport => "transport",
            Self::Timetable => "timetable",
        }
    }
}

impl std::fmt::Display for RouteGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// ゲートの判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 通過
    Allow,
    /// 拒否（拒否理由となったロール）
    Deny(Role),
}

impl Decision {
    /// 許可か
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// ロール → 拒否グループ集合のテーブル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    denied: BTreeMap<Role, BTreeSet<RouteGroup>>,
}

impl Default for AccessPolicy {
    /// staffを管理系グループから締め出す既定テーブル
    fn default() -> Self {
        let mut denied = BTreeMap::new();
        denied.insert(
            Role::Staff,
            RouteGroup::ADMINISTRATIVE.iter().copied().collect(),
        );
        Self { denied }
    }
}

/// YAMLポリシーファイルの形式
///
/// ```yaml
/// deny:
///   staff: [departments, staff, fees, activity-logs, academic-years, backups]
///   student: [fees]
/// ```
#[derive(Debug, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    deny: BTreeMap<Role, Vec<RouteGroup>>,
}

impl AccessPolicy {
    /// 拒否なしの空テーブル
    pub fn empty() -> Self {
        Self {
            denied: BTreeMap::new(),
        }
    }

    /// ロールにグループ拒否を追加
    pub fn deny(mut self, role: Role, group: RouteGroup) -> Self {
        self.denied.entry(role).or_default().insert(group);
        self
    }

    /// YAML文字列から読み込む
    ///
    /// `admin`への拒否指定は設定エラー。
    pub fn from_yaml(source: &str) -> HubResult<Self> {
        let file: PolicyFile = serde_yaml::from_str(source)
            .map_err(|e| CommonError::Config(format!("Invalid policy file: {}", e)))?;

        let mut policy = Self::empty();
        for (role, groups) in file.deny {
            if role == Role::Admin && !groups.is_empty() {
                return Err(HubError::Common(CommonError::Config(
                    "Policy file must not deny groups to admin".to_string(),
                )));
            }
            for group in groups {
                policy = policy.deny(role, group);
            }
        }
        Ok(policy)
    }

    /// YAMLファイルから読み込む
    pub fn from_file(path: &Path) -> HubResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            CommonError::Config(format!(
                "Failed to read policy file {}: {}",
                path.display(),
                e
            ))
        })?;
        let policy = Self::from_yaml(&source)?;
        tracing::info!(path = %path.display(), "Loaded access policy");
        Ok(policy)
    }

    /// ロールがグループを拒否されているか
    pub fn denies(&self, role: Role, group: RouteGroup) -> bool {
        self.denied
            .get(&role)
            .is_some_and(|groups| groups.contains(&group))
    }

    /// ロール集合に対する判定
    pub fn decide_roles(&self, roles: &[Role], group: RouteGroup) -> Decision {
        if roles.contains(&Role::Admin) {
            return Decision::Allow;
        }
        roles
            .iter()
            .copied()
            .find(|role| self.denies(*role, group))
            .map_or(Decision::Allow, Decision::Deny)
    }

    /// Principalに対する判定
    pub fn decide(&self, principal: &Principal, group: RouteGroup) -> Decision {
        self.decide_roles(&principal.roles, group)
    }

    /// ロールに拒否されているグループ一覧
    pub fn denied_groups(&self, role: Role) -> Vec<RouteGroup> {
        self.denied
            .get(&role)
            .map(|groups| groups.iter().copied().collect())
            .unwrap_or_default()
    }
}
