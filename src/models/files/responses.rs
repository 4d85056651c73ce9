use serde::Serialize;

use super::entities::FileRecord;

/// 上传结果
#[derive(Debug, Serialize)]
pub struct FileUploadResponse {
    pub file: FileRecord,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub items: Vec<FileRecord>,
}
