use chrono::{DateTime, Utc};
use serde::Serialize;

use super::entities::{ConsentStatus, User};

// 管理员用户列表项
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserItem {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// DD.MM.YYYY
    pub birthday: Option<String>,
    pub consent_status: ConsentStatus,
    pub classes: Vec<String>,
    pub import_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AdminUserItem {
    pub fn new(user: User, consent_status: ConsentStatus, classes: Vec<String>) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            birthday: user.birthday.map(|b| b.format("%d.%m.%Y").to_string()),
            consent_status,
            classes,
            import_hash: user.import_hash,
            created_at: user.created_at,
        }
    }
}

// 用户响应
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

// 删除用户响应
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub user_id: i64,
    pub trashbin_id: i64,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: Vec<DeleteUserResponse>,
}
