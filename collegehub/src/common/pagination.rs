//! ページ指定の正規化

use serde::{Deserialize, Serialize};

/// 1ページあたりの既定件数
pub const DEFAULT_PER_PAGE: i64 = 15;
/// 1ページあたりの上限件数
pub const MAX_PER_PAGE: i64 = 100;

/// 一覧取得のページ指定
///
/// 生の値はクエリ文字列そのまま。取り出すときは`page()`/`per_page()`で正規化する。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    /// ページ番号（1始まり）
    pub page: Option<i64>,
    /// ページあたり件数
    pub per_page: Option<i64>,
}

impl PageParams {
    /// ページ指定を作成
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    /// 正規化済みのページ番号（1未満は1）
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// 正規化済みのページあたり件数（既定15、1..=100）
    pub fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// SQLのOFFSET
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}
