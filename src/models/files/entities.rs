use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 文件所有者类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RefOwnerModel {
    User,
    Course,
    Team,
}

impl RefOwnerModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefOwnerModel::User => "user",
            RefOwnerModel::Course => "course",
            RefOwnerModel::Team => "team",
        }
    }
}

impl std::str::FromStr for RefOwnerModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(RefOwnerModel::User),
            "course" => Ok(RefOwnerModel::Course),
            "team" => Ok(RefOwnerModel::Team),
            _ => Err(format!("Invalid owner model: {s}")),
        }
    }
}

/// 权限条目指向的主体类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RefPermModel {
    User,
    Role,
}

impl RefPermModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefPermModel::User => "user",
            RefPermModel::Role => "role",
        }
    }
}

impl std::str::FromStr for RefPermModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(RefPermModel::User),
            "role" => Ok(RefPermModel::Role),
            _ => Err(format!("Invalid permission model: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Read,
    Write,
    Create,
    Delete,
}

// 文件权限条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilePermission {
    /// 用户 ID 或角色名
    pub ref_id: String,
    pub ref_perm_model: RefPermModel,
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub delete: bool,
}

impl FilePermission {
    pub fn allows(&self, action: FileAction) -> bool {
        match action {
            FileAction::Read => self.read,
            FileAction::Write => self.write,
            FileAction::Create => self.create,
            FileAction::Delete => self.delete,
        }
    }

    pub fn for_role(role: &str, write: bool, create: bool, delete: bool) -> Self {
        Self {
            ref_id: role.to_string(),
            ref_perm_model: RefPermModel::Role,
            read: true,
            write,
            create,
            delete,
        }
    }
}

// 文件元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub name: String,
    pub size: i64,
    pub file_type: String,
    #[serde(skip)]
    pub storage_file_name: Option<String>,
    pub is_directory: bool,
    pub parent_id: Option<i64>,
    pub owner_id: i64,
    pub ref_owner_model: RefOwnerModel,
    pub creator_id: i64,
    pub lock_id: Option<String>,
    pub version: i32,
    pub permissions: Vec<FilePermission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// 文件扩展名（含点号），无扩展名时为空串
    pub fn extension(&self) -> &str {
        match self.name.rfind('.') {
            Some(pos) if pos > 0 => &self.name[pos..],
            _ => "",
        }
    }
}
