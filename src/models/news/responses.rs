use serde::Serialize;

use super::entities::News;
use crate::models::auth::permissions::Permission;

// 附带当前用户在目标上的新闻权限
#[derive(Debug, Clone, Serialize)]
pub struct NewsResponse {
    #[serde(flatten)]
    pub news: News,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct NewsDeleteResponse {
    pub id: i64,
}
