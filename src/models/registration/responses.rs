use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::users::entities::{Account, Consent, User, UserParent, UserRole};

// 注册验证码
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationPin {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub pin: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

// 注册表单预填数据
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationPrefill {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
}

// 注册结果
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub user: User,
    pub account: Account,
    pub consent: Consent,
    pub parents: Vec<UserParent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HashResponse {
    pub hash: String,
}
