use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,       // 学生
    Teacher,       // 教师
    Administrator, // 学校管理员
    Superhero,     // 平台超级管理员
    Expert,        // 外部专家
    Parent,        // 家长
    DemoStudent,
    DemoTeacher,
}

impl UserRole {
    pub const STUDENT: &'static str = "student";
    pub const TEACHER: &'static str = "teacher";
    pub const ADMINISTRATOR: &'static str = "administrator";
    pub const SUPERHERO: &'static str = "superhero";
    pub const EXPERT: &'static str = "expert";
    pub const PARENT: &'static str = "parent";
    pub const DEMO_STUDENT: &'static str = "demo_student";
    pub const DEMO_TEACHER: &'static str = "demo_teacher";

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => Self::STUDENT,
            UserRole::Teacher => Self::TEACHER,
            UserRole::Administrator => Self::ADMINISTRATOR,
            UserRole::Superhero => Self::SUPERHERO,
            UserRole::Expert => Self::EXPERT,
            UserRole::Parent => Self::PARENT,
            UserRole::DemoStudent => Self::DEMO_STUDENT,
            UserRole::DemoTeacher => Self::DEMO_TEACHER,
        }
    }

    /// 可以通过注册链接自助完成注册的角色
    pub fn can_register(&self) -> bool {
        matches!(
            self,
            UserRole::Student | UserRole::Teacher | UserRole::Administrator | UserRole::Expert
        )
    }

    pub fn is_superhero(&self) -> bool {
        *self == UserRole::Superhero
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::STUDENT => Ok(UserRole::Student),
            Self::TEACHER => Ok(UserRole::Teacher),
            Self::ADMINISTRATOR => Ok(UserRole::Administrator),
            Self::SUPERHERO => Ok(UserRole::Superhero),
            Self::EXPERT => Ok(UserRole::Expert),
            Self::PARENT => Ok(UserRole::Parent),
            Self::DEMO_STUDENT => Ok(UserRole::DemoStudent),
            Self::DEMO_TEACHER => Ok(UserRole::DemoTeacher),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub school_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub birthday: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_hash: Option<String>,
    pub ldap_dn: Option<String>,
    pub ldap_id: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

// 登录账户
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub system_id: Option<i64>,
    pub activated: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// 家长联系人
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserParent {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// 隐私与使用条款同意书
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consent {
    pub id: i64,
    pub user_id: i64,
    pub user_privacy_consent: bool,
    pub user_terms_consent: bool,
    pub parent_privacy_consent: Option<bool>,
    pub parent_terms_consent: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 同意书状态，用于管理员列表筛选
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum ConsentStatus {
    Missing,
    ParentsAgreed,
    Ok,
}

impl ConsentStatus {
    pub fn of(consent: Option<&Consent>) -> Self {
        match consent {
            Some(c) if c.user_privacy_consent && c.user_terms_consent => ConsentStatus::Ok,
            Some(c)
                if c.parent_privacy_consent == Some(true)
                    && c.parent_terms_consent == Some(true) =>
            {
                ConsentStatus::ParentsAgreed
            }
            _ => ConsentStatus::Missing,
        }
    }
}

impl std::str::FromStr for ConsentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missing" => Ok(ConsentStatus::Missing),
            "parentsAgreed" => Ok(ConsentStatus::ParentsAgreed),
            "ok" => Ok(ConsentStatus::Ok),
            _ => Err(format!("Invalid consent status: {s}")),
        }
    }
}

// 回收站记录，保存删除用户前的原始数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trashbin {
    pub id: i64,
    pub user_id: i64,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        assert_eq!("demo_teacher".parse::<UserRole>(), Ok(UserRole::DemoTeacher));
        assert_eq!(UserRole::Administrator.to_string(), "administrator");
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_registration_roles() {
        assert!(UserRole::Student.can_register());
        assert!(UserRole::Expert.can_register());
        assert!(!UserRole::Parent.can_register());
        assert!(!UserRole::Superhero.can_register());
    }

    #[test]
    fn test_consent_status() {
        let now = Utc::now();
        let mut consent = Consent {
            id: 1,
            user_id: 1,
            user_privacy_consent: false,
            user_terms_consent: false,
            parent_privacy_consent: Some(true),
            parent_terms_consent: Some(true),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(ConsentStatus::of(None), ConsentStatus::Missing);
        assert_eq!(ConsentStatus::of(Some(&consent)), ConsentStatus::ParentsAgreed);
        consent.user_privacy_consent = true;
        consent.user_terms_consent = true;
        assert_eq!(ConsentStatus::of(Some(&consent)), ConsentStatus::Ok);
    }
}
