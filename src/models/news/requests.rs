use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::entities::{NewsTarget, NewsTargetModel};
use crate::models::common::PaginationQuery;

// 新闻创建请求（来自HTTP请求）
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNewsRequest {
    pub title: String,
    pub content: String,
    pub display_at: Option<DateTime<Utc>>,
    pub target_model: Option<NewsTargetModel>,
    pub target_id: Option<i64>,
}

// 新闻更新请求
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateNewsRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub display_at: Option<DateTime<Utc>>,
}

// 新闻列表查询参数
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NewsListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub target_model: Option<NewsTargetModel>,
    pub target_id: Option<i64>,
    #[serde(default)]
    pub unpublished: bool,
}

impl NewsListParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::from_options(self.page, self.size)
    }
}

// 新闻写入（存储层）
#[derive(Debug, Clone)]
pub struct CreateNewsRecord {
    pub school_id: i64,
    pub creator_id: i64,
    pub title: String,
    pub content: String,
    pub display_at: DateTime<Utc>,
    pub target: NewsTarget,
}

#[derive(Debug, Clone)]
pub struct UpdateNewsRecord {
    pub updater_id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub display_at: Option<DateTime<Utc>>,
}

/// 某一目标类型下允许查询的实体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsTargetFilter {
    pub model: NewsTargetModel,
    pub ids: Vec<i64>,
}

// 新闻列表查询（存储层）
#[derive(Debug, Clone)]
pub struct NewsQuery {
    pub targets: Vec<NewsTargetFilter>,
    pub unpublished: bool,
    pub now: DateTime<Utc>,
    pub page: u64,
    pub size: u64,
}
