use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::files::entities::{FileAction, FileRecord};
use crate::models::users::entities::User;
use crate::services::files::blob::BlobStore;
use crate::services::files::permissions::ensure;
use crate::storage::Storage;

use super::WopiReply;
use super::info::find_file;
use super::lock::can_put;

pub const WRONG_OVERRIDE: &str = "WopiFilesContentsService: Wrong X-WOPI-Override header value!";

fn storage_name(file: &FileRecord) -> Result<&str> {
    file.storage_file_name
        .as_deref()
        .ok_or_else(|| SchulCloudError::bad_request("Directories have no contents"))
}

/// GetFile
pub async fn get_file(
    storage: &Arc<dyn Storage>,
    blobs: &BlobStore,
    user: &User,
    id: i64,
) -> Result<(FileRecord, Vec<u8>)> {
    let file = find_file(storage, id).await?;
    ensure(storage, user, &file, FileAction::Read).await?;
    let bytes = blobs.read(storage_name(&file)?).await?;
    Ok((file, bytes))
}

/// PutFile，写入内容后版本号加一
pub async fn put_file(
    storage: &Arc<dyn Storage>,
    blobs: &BlobStore,
    user: &User,
    id: i64,
    wopi_override: Option<&str>,
    lock: Option<&str>,
    bytes: &[u8],
) -> Result<WopiReply> {
    if wopi_override != Some("PUT") {
        return Err(SchulCloudError::bad_request(WRONG_OVERRIDE));
    }

    let file = find_file(storage, id).await?;
    ensure(storage, user, &file, FileAction::Write).await?;

    if !can_put(file.lock_id.as_deref(), lock, file.size) {
        return Ok(WopiReply::Conflict(file.lock_id));
    }

    blobs.write(storage_name(&file)?, bytes).await?;
    let updated = storage
        .update_file_contents(file.id, bytes.len() as i64)
        .await?
        .ok_or_else(|| SchulCloudError::not_found(super::info::FILE_NOT_FOUND))?;

    tracing::debug!("WOPI PutFile {} by user {}, version {}", id, user.id, updated.version);
    Ok(WopiReply::Saved {
        lock_id: updated.lock_id,
        version: updated.version,
    })
}
