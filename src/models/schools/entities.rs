use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 学校
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub ldap_school_identifier: Option<String>,
    pub system_id: Option<i64>,
    /// 当前学年，如 "2024/25"
    pub current_year: Option<String>,
    pub federal_state: Option<String>,
    /// 数据由外部源系统管理
    pub is_external: bool,
    pub in_maintenance: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateSchoolRequest {
    pub name: String,
    pub ldap_school_identifier: Option<String>,
    pub system_id: Option<i64>,
    pub current_year: Option<String>,
    pub federal_state: Option<String>,
    pub is_external: bool,
}

// LDAP 目录系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapSystem {
    pub id: i64,
    pub alias: String,
    pub provider: LdapProvider,
    pub url: String,
    pub root_path: String,
    pub search_user: String,
    #[serde(skip)]
    pub search_password: String,
    pub import_url: Option<String>,
    pub import_user: Option<String>,
    #[serde(skip)]
    pub import_password: Option<String>,
    pub active: bool,
    pub last_sync_attempt: Option<DateTime<Utc>>,
    pub last_successful_full_sync: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSystemRequest {
    pub alias: String,
    pub provider: LdapProvider,
    pub url: String,
    pub root_path: String,
    pub search_user: String,
    pub search_password: String,
    pub import_url: Option<String>,
    pub import_user: Option<String>,
    pub import_password: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LdapProvider {
    Univention,
    General,
}

impl LdapProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LdapProvider::Univention => "univention",
            LdapProvider::General => "general",
        }
    }
}

impl std::str::FromStr for LdapProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "univention" => Ok(LdapProvider::Univention),
            "general" => Ok(LdapProvider::General),
            _ => Err(format!("Invalid LDAP provider: {s}")),
        }
    }
}
