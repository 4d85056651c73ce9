use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 班级
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    /// "static" 表示名称由外部系统给定
    pub name_format: String,
    pub ldap_dn: Option<String>,
    pub year: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClassMemberRole {
    Student,
    Teacher,
}

impl ClassMemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassMemberRole::Student => "student",
            ClassMemberRole::Teacher => "teacher",
        }
    }
}

// 课程
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CourseRole {
    Teacher,
    SubstituteTeacher,
    Student,
}

impl CourseRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseRole::Teacher => "teacher",
            CourseRole::SubstituteTeacher => "substitute_teacher",
            CourseRole::Student => "student",
        }
    }
}

impl std::str::FromStr for CourseRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher" => Ok(CourseRole::Teacher),
            "substitute_teacher" => Ok(CourseRole::SubstituteTeacher),
            "student" => Ok(CourseRole::Student),
            _ => Err(format!("Invalid course role: {s}")),
        }
    }
}

// 团队
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TeamRole {
    #[serde(rename = "teamowner")]
    Owner,
    #[serde(rename = "teamadministrator")]
    Administrator,
    #[serde(rename = "teamleader")]
    Leader,
    #[serde(rename = "teamexpert")]
    Expert,
    #[serde(rename = "teammember")]
    Member,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Owner => "teamowner",
            TeamRole::Administrator => "teamadministrator",
            TeamRole::Leader => "teamleader",
            TeamRole::Expert => "teamexpert",
            TeamRole::Member => "teammember",
        }
    }
}

impl std::str::FromStr for TeamRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teamowner" => Ok(TeamRole::Owner),
            "teamadministrator" => Ok(TeamRole::Administrator),
            "teamleader" => Ok(TeamRole::Leader),
            "teamexpert" => Ok(TeamRole::Expert),
            "teammember" => Ok(TeamRole::Member),
            _ => Err(format!("Invalid team role: {s}")),
        }
    }
}

/// 用户在课程或团队中的成员关系
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership<R> {
    pub group_id: i64,
    pub role: R,
}
