use serde::Serialize;

const MAX_PAGE_SIZE: u64 = 100;
// 超出此页码的请求按最后可表示的页处理，保证偏移量不溢出
const MAX_PAGE: u64 = 1_000_000;

/// 分页参数（页码从 1 开始）
#[derive(Debug, Clone, Copy)]
pub struct PaginationQuery {
    pub page: i64,
    pub size: i64,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

impl PaginationQuery {
    /// 由查询字段构造，缺省页码 1、页大小 10
    pub fn from_options(page: Option<i64>, size: Option<i64>) -> Self {
        let defaults = Self::default();
        Self {
            page: page.unwrap_or(defaults.page),
            size: size.unwrap_or(defaults.size),
        }
    }

    /// 规范化后的 (页码, 页大小)
    pub fn normalized(&self) -> (u64, u64) {
        let page = (self.page.max(1) as u64).min(MAX_PAGE);
        let size = (self.size.max(1) as u64).min(MAX_PAGE_SIZE);
        (page, size)
    }
}

/// `total` 为过滤后的总数，`skip` 为本页之前的条目数
#[derive(Debug, Clone, Serialize)]
pub struct PaginationInfo {
    pub total: u64,
    pub limit: u64,
    pub skip: u64,
    pub page: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u64, size: u64, total: u64) -> Self {
        Self {
            items,
            pagination: PaginationInfo {
                total,
                limit: size,
                skip: page.saturating_sub(1).saturating_mul(size),
                page,
            },
        }
    }
}
