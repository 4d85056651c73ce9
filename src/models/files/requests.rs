use serde::Deserialize;

use super::entities::{FilePermission, RefOwnerModel};

// 文件创建（存储层）
#[derive(Debug, Clone)]
pub struct CreateFileRequest {
    pub name: String,
    pub size: i64,
    pub file_type: String,
    pub storage_file_name: Option<String>,
    pub parent_id: Option<i64>,
    pub owner_id: i64,
    pub ref_owner_model: RefOwnerModel,
    pub creator_id: i64,
    pub permissions: Vec<FilePermission>,
}

// 上传目标（来自查询参数）
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UploadParams {
    pub owner_model: Option<RefOwnerModel>,
    pub owner_id: Option<i64>,
    pub parent_id: Option<i64>,
    /// 课程或团队文件是否允许学生编辑
    #[serde(default)]
    pub students_can_edit: bool,
}

// 文件列表查询参数
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileListParams {
    pub owner_model: Option<RefOwnerModel>,
    pub owner_id: Option<i64>,
    pub parent_id: Option<i64>,
}
