//! `POST /wopi/files/{id}` 上按 X-WOPI-Override 分派的操作

use std::sync::Arc;

use crate::errors::{Result, SchulCloudError};
use crate::models::files::entities::{FileAction, FileRecord};
use crate::models::users::entities::User;
use crate::models::wopi::responses::RenameFileResponse;
use crate::services::files::blob::BlobStore;
use crate::services::files::permissions::ensure;
use crate::storage::Storage;

use super::WopiReply;
use super::info::find_file;
use super::lock::{LockDecision, LockRequest, decide};

pub const NOT_IMPLEMENTED: &str = "This function is currently not implemented!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WopiOverride {
    Lock,
    GetLock,
    RefreshLock,
    Unlock,
    RenameFile,
    Delete,
    GetShareUrl,
    PutUserInfo,
}

impl std::str::FromStr for WopiOverride {
    type Err = SchulCloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LOCK" => Ok(WopiOverride::Lock),
            "GET_LOCK" => Ok(WopiOverride::GetLock),
            "REFRESH_LOCK" => Ok(WopiOverride::RefreshLock),
            "UNLOCK" => Ok(WopiOverride::Unlock),
            "RENAME_FILE" => Ok(WopiOverride::RenameFile),
            "DELETE" => Ok(WopiOverride::Delete),
            "GET_SHARE_URL" => Ok(WopiOverride::GetShareUrl),
            "PUT_USER_INFO" => Ok(WopiOverride::PutUserInfo),
            other => Err(SchulCloudError::bad_request(format!(
                "Unsupported X-WOPI-Override header value: {other}"
            ))),
        }
    }
}

/// 请求头中与操作相关的字段
#[derive(Debug, Clone, Default)]
pub struct WopiHeaders {
    pub wopi_override: Option<String>,
    pub lock: Option<String>,
    pub old_lock: Option<String>,
    pub requested_name: Option<String>,
}

pub async fn perform(
    storage: &Arc<dyn Storage>,
    blobs: &BlobStore,
    user: &User,
    id: i64,
    headers: WopiHeaders,
) -> Result<WopiReply> {
    let action = headers
        .wopi_override
        .as_deref()
        .ok_or_else(|| SchulCloudError::bad_request("X-WOPI-Override header is missing"))?
        .parse::<WopiOverride>()?;

    let file = find_file(storage, id).await?;

    match action {
        WopiOverride::GetLock => {
            ensure(storage, user, &file, FileAction::Read).await?;
            Ok(WopiReply::Lock(file.lock_id))
        }
        WopiOverride::Lock | WopiOverride::RefreshLock | WopiOverride::Unlock => {
            ensure(storage, user, &file, FileAction::Write).await?;
            // 客户端未给出锁值时由服务端生成
            let generated = uuid::Uuid::new_v4().to_string();
            let lock = headers.lock.as_deref().unwrap_or(&generated);
            let request = match (action, headers.old_lock.as_deref()) {
                (WopiOverride::Lock, Some(old)) => LockRequest::Relock { old, new: lock },
                (WopiOverride::Lock, None) => LockRequest::Lock(lock),
                (WopiOverride::RefreshLock, _) => LockRequest::Refresh(lock),
                _ => LockRequest::Unlock(lock),
            };
            apply_lock(storage, &file, &request).await
        }
        WopiOverride::RenameFile => {
            ensure(storage, user, &file, FileAction::Write).await?;
            rename(storage, &file, headers.lock.as_deref(), headers.requested_name.as_deref()).await
        }
        WopiOverride::Delete => {
            ensure(storage, user, &file, FileAction::Delete).await?;
            if file.lock_id.is_some() {
                return Ok(WopiReply::Conflict(file.lock_id));
            }
            storage.delete_file(file.id).await?;
            if let Some(name) = file.storage_file_name.as_deref() {
                blobs.remove(name).await?;
            }
            tracing::info!("WOPI DeleteFile {} by user {}", file.id, user.id);
            Ok(WopiReply::Ok)
        }
        WopiOverride::GetShareUrl | WopiOverride::PutUserInfo => {
            Err(SchulCloudError::not_implemented(NOT_IMPLEMENTED))
        }
    }
}

/// 判定锁转换并以 compare-and-set 落库，并发修改时以最新锁回报冲突
async fn apply_lock(
    storage: &Arc<dyn Storage>,
    file: &FileRecord,
    request: &LockRequest<'_>,
) -> Result<WopiReply> {
    let current = file.lock_id.as_deref();
    match decide(current, request) {
        LockDecision::Conflict(existing) => Ok(WopiReply::Conflict(existing)),
        LockDecision::Set(new_lock) => {
            if storage
                .compare_and_set_file_lock(file.id, current, new_lock.as_deref())
                .await?
            {
                Ok(WopiReply::Lock(new_lock))
            } else {
                let latest = find_file(storage, file.id).await?;
                Ok(WopiReply::Conflict(latest.lock_id))
            }
        }
    }
}

/// 重命名保留原扩展名
async fn rename(
    storage: &Arc<dyn Storage>,
    file: &FileRecord,
    lock: Option<&str>,
    requested_name: Option<&str>,
) -> Result<WopiReply> {
    if let Some(current) = file.lock_id.as_deref()
        && Some(current) != lock
    {
        return Ok(WopiReply::Conflict(file.lock_id.clone()));
    }

    let requested = requested_name
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SchulCloudError::bad_request("X-WOPI-RequestedName header is missing"))?;

    let new_name = format!("{requested}{}", file.extension());
    storage
        .rename_file(file.id, &new_name)
        .await?
        .ok_or_else(|| SchulCloudError::not_found(super::info::FILE_NOT_FOUND))?;

    Ok(WopiReply::Renamed(RenameFileResponse {
        name: requested.to_string(),
    }))
}
