use chrono::{DateTime, Utc};
use serde::Deserialize;

// 注册请求
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RegistrationRequest {
    /// 注册链接中的导入哈希
    pub import_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: Option<DateTime<Utc>>,
    pub password_1: Option<String>,
    pub password_2: Option<String>,
    pub pin: String,
    #[serde(default)]
    pub privacy_consent: bool,
    #[serde(default)]
    pub terms_of_use_consent: bool,
    pub parent_first_name: Option<String>,
    pub parent_last_name: Option<String>,
    pub parent_email: Option<String>,
}

impl RegistrationRequest {
    /// 填写了家长信息即视为家长注册
    pub fn parent_email(&self) -> Option<&str> {
        self.parent_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

// 验证码请求
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationPinRequest {
    pub email: String,
    #[serde(default)]
    pub silent: bool,
}

// 生成注册哈希请求
#[derive(Debug, Clone, Deserialize, Default)]
pub struct HashRequest {
    pub to_hash: Option<String>,
    #[serde(default)]
    pub save: bool,
    #[serde(default)]
    pub patch_user: bool,
}

/// 注册落库所需的全部变更（存储层，单事务执行）
#[derive(Debug, Clone)]
pub struct RegistrationRecord {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birthday: Option<DateTime<Utc>>,
    pub password_hash: String,
    pub parent: Option<ParentRecord>,
    pub user_privacy_consent: bool,
    pub user_terms_consent: bool,
    pub pin_id: i64,
}

#[derive(Debug, Clone)]
pub struct ParentRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
