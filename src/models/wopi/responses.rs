use serde::Serialize;

/// WOPI CheckFileInfo 响应，字段名遵循 WOPI 协议
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CheckFileInfoResponse {
    pub base_file_name: String,
    pub owner_id: String,
    pub size: i64,
    pub user_id: String,
    pub version: String,
    pub user_friendly_name: String,
    pub user_can_write: bool,
    pub user_can_not_write_relative: bool,
    pub user_can_rename: bool,
    pub read_only: bool,
    pub last_modified_time: String,
    #[serde(flatten)]
    pub capabilities: HostCapabilities,
}

/// 宿主能力声明
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct HostCapabilities {
    pub supports_locks: bool,
    pub supports_get_lock: bool,
    pub supports_extended_lock_length: bool,
    pub supports_update: bool,
    pub supports_rename: bool,
    pub supports_delete_file: bool,
    pub supports_cobalt: bool,
    pub supports_folders: bool,
    pub supports_user_info: bool,
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self {
            supports_locks: true,
            supports_get_lock: true,
            supports_extended_lock_length: true,
            supports_update: true,
            supports_rename: true,
            supports_delete_file: true,
            supports_cobalt: false,
            supports_folders: false,
            supports_user_info: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RenameFileResponse {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutFileResponse {
    pub lock_id: Option<String>,
}
