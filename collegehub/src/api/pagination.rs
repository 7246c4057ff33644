//! ページネーション付き一覧レスポンス

use crate::common::pagination::PageParams;
use serde::{Deserialize, Serialize};

/// ページ単位の一覧
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// このページの要素
    pub data: Vec<T>,
    /// 現在のページ番号
    pub current_page: i64,
    /// ページあたり件数
    pub per_page: i64,
    /// 総件数
    pub total: i64,
    /// 最終ページ番号（0件でも1）
    pub last_page: i64,
}

impl<T> Paginated<T> {
    /// ページを組み立てる
    pub fn new(data: Vec<T>, current_page: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let last_page = ((total + per_page - 1) / per_page).max(1);
        Self {
            data,
            current_page,
            per_page,
            total,
            last_page,
        }
    }

    /// 正規化済みのページ指定からページを組み立てる
    pub fn from_params(data: Vec<T>, params: &PageParams, total: i64) -> Self {
        Self::new(data, params.page(), params.per_page(), total)
    }
}
