use serde::{Deserialize, Serialize};

use crate::models::users::entities::User;

use super::permissions::Permission;

// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub user: User,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub user: User,
    pub permissions: Vec<Permission>,
}

/// JWT 白名单条目，记录过期时间戳
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtWhitelistEntry {
    pub user_id: i64,
    pub expires_at: i64,
}

// JWT 计时器响应，ttl 单位为秒
#[derive(Debug, Serialize)]
pub struct JwtTimerResponse {
    pub ttl: i64,
}
