use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::entities::UserRole;
use crate::models::common::PaginationQuery;

// 用户创建请求（存储层）
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub school_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub birthday: Option<DateTime<Utc>>,
    pub import_hash: Option<String>,
    pub ldap_dn: Option<String>,
    pub ldap_id: Option<String>,
}

// 用户更新请求（存储层），None 表示不修改
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub birthday: Option<DateTime<Utc>>,
    pub ldap_dn: Option<String>,
    /// Some(None) 清空导入哈希
    pub import_hash: Option<Option<String>>,
}

// 账户创建请求（存储层）
#[derive(Debug, Clone)]
pub struct CreateAccountRequest {
    pub user_id: i64,
    pub username: String,
    pub password_hash: Option<String>,
    pub system_id: Option<i64>,
    pub activated: bool,
}

// 管理员用户列表查询参数（来自HTTP请求）
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminUserListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// 逗号分隔的班级 ID
    pub classes: Option<String>,
    /// missing / parentsAgreed / ok
    pub consent_status: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    /// 逗号分隔的用户 ID
    pub users: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl AdminUserListParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::from_options(self.page, self.size)
    }
}

// 管理员用户列表查询（存储层）
#[derive(Debug, Clone, Default)]
pub struct SchoolUserFilter {
    pub school_id: i64,
    pub role: Option<UserRole>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub class_ids: Vec<i64>,
    pub user_ids: Vec<i64>,
    pub created_after: Option<i64>,
    pub created_before: Option<i64>,
}

// 管理员创建/全量更新学生或教师
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: Option<DateTime<Utc>>,
}

// 管理员部分更新学生或教师
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminUserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<DateTime<Utc>>,
}

impl From<AdminUserRequest> for AdminUserPatch {
    fn from(req: AdminUserRequest) -> Self {
        Self {
            first_name: Some(req.first_name),
            last_name: Some(req.last_name),
            email: Some(req.email),
            birthday: req.birthday,
        }
    }
}

// 批量删除参数
#[derive(Debug, Clone, Deserialize)]
pub struct BulkDeleteParams {
    /// 逗号分隔的用户 ID
    pub ids: String,
}
