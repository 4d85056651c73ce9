use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::files::entities::{FileAction, FileRecord};
use crate::models::users::entities::User;
use crate::models::wopi::responses::{CheckFileInfoResponse, HostCapabilities};
use crate::services::files::permissions::{can_write, ensure};
use crate::storage::Storage;

pub const FILE_NOT_FOUND: &str = "The requested file was not found!";

pub(super) async fn find_file(storage: &Arc<dyn Storage>, id: i64) -> Result<FileRecord> {
    storage
        .get_file_by_id(id)
        .await?
        .ok_or_else(|| SchulCloudError::not_found(FILE_NOT_FOUND))
}

/// CheckFileInfo，通过读权限检查的用户即视为文件所有者
pub async fn check_file_info(
    storage: &Arc<dyn Storage>,
    user: &User,
    id: i64,
) -> Result<CheckFileInfoResponse> {
    let file = find_file(storage, id).await?;
    ensure(storage, user, &file, FileAction::Read).await?;
    let writable = can_write(storage, user, &file).await?;

    Ok(CheckFileInfoResponse {
        base_file_name: file.name,
        owner_id: user.id.to_string(),
        size: file.size,
        user_id: user.id.to_string(),
        version: file.version.to_string(),
        user_friendly_name: user.full_name(),
        user_can_write: writable,
        user_can_not_write_relative: true,
        user_can_rename: writable,
        read_only: !writable,
        last_modified_time: file.updated_at.to_rfc3339(),
        capabilities: HostCapabilities::default(),
    })
}
