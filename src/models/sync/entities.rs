use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::users::entities::UserRole;

// 目录中的学校
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LdapSchool {
    /// 学校在目录中的标识 (ou)
    pub ldap_ou: String,
    pub display_name: String,
}

// 目录中的用户
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LdapUser {
    pub ldap_id: String,
    pub ldap_dn: String,
    pub ldap_uid: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
}

// 目录中的班级
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LdapClass {
    pub ldap_dn: String,
    pub name: String,
    /// 成员 DN
    pub member_dns: Vec<String>,
}

/// 同步队列消息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SyncMessage {
    SyncSchool {
        system_id: i64,
        school: LdapSchool,
    },
    SyncUser {
        system_id: i64,
        school_ou: String,
        user: LdapUser,
    },
    SyncClass {
        system_id: i64,
        school_ou: String,
        class: LdapClass,
    },
}

impl SyncMessage {
    pub fn action(&self) -> &'static str {
        match self {
            SyncMessage::SyncSchool { .. } => "sync_school",
            SyncMessage::SyncUser { .. } => "sync_user",
            SyncMessage::SyncClass { .. } => "sync_class",
        }
    }
}

// 单个学校的同步统计
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchoolSyncStats {
    pub ldap_ou: String,
    pub name: String,
    pub users: usize,
    pub classes: usize,
    pub skipped: bool,
    pub success: bool,
}

// 一次完整同步的统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncRunStats {
    pub system_id: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub schools: Vec<SchoolSyncStats>,
    pub errors: Vec<String>,
    pub success: bool,
}
