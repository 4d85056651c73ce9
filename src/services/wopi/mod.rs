//! WOPI 宿主接口，供在线 Office 编辑器读写文件
//!
//! 客户端通过 `access_token` 查询参数携带 JWT。

pub mod actions;
pub mod contents;
pub mod info;
pub mod lock;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::models::wopi::responses::{PutFileResponse, RenameFileResponse};
use crate::storage::Storage;

use super::current_user;
use super::files::blob::BlobStore;
use actions::WopiHeaders;

pub const HEADER_OVERRIDE: &str = "X-WOPI-Override";
pub const HEADER_LOCK: &str = "X-WOPI-Lock";
pub const HEADER_OLD_LOCK: &str = "X-WOPI-OldLock";
pub const HEADER_REQUESTED_NAME: &str = "X-WOPI-RequestedName";
pub const HEADER_ITEM_VERSION: &str = "X-WOPI-ItemVersion";

/// WOPI 操作结果，由 HTTP 层转换为协议规定的状态码与响应头
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WopiReply {
    Ok,
    Lock(Option<String>),
    /// 409，X-WOPI-Lock 为当前锁
    Conflict(Option<String>),
    Saved {
        lock_id: Option<String>,
        version: i32,
    },
    Renamed(RenameFileResponse),
}

impl WopiReply {
    pub fn into_response(self) -> HttpResponse {
        match self {
            WopiReply::Ok => HttpResponse::Ok().finish(),
            WopiReply::Lock(lock) => HttpResponse::Ok()
                .insert_header((HEADER_LOCK, lock.unwrap_or_default()))
                .finish(),
            WopiReply::Conflict(lock) => HttpResponse::Conflict()
                .insert_header((HEADER_LOCK, lock.unwrap_or_default()))
                .finish(),
            WopiReply::Saved { lock_id, version } => HttpResponse::Ok()
                .insert_header((HEADER_ITEM_VERSION, version.to_string()))
                .json(PutFileResponse { lock_id }),
            WopiReply::Renamed(renamed) => HttpResponse::Ok().json(renamed),
        }
    }
}

fn header(request: &HttpRequest, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub struct WopiService {
    storage: Option<Arc<dyn Storage>>,
}

impl WopiService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn check_file_info(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let info = info::check_file_info(&self.get_storage(request), &user, id).await?;
        Ok(HttpResponse::Ok().json(info))
    }

    pub async fn get_file(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let (file, bytes) =
            contents::get_file(&self.get_storage(request), &BlobStore::from_config(), &user, id)
                .await?;
        Ok(HttpResponse::Ok()
            .insert_header((HEADER_ITEM_VERSION, file.version.to_string()))
            .content_type(file.file_type)
            .body(bytes))
    }

    pub async fn put_file(
        &self,
        request: &HttpRequest,
        id: i64,
        body: web::Bytes,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let reply = contents::put_file(
            &self.get_storage(request),
            &BlobStore::from_config(),
            &user,
            id,
            header(request, HEADER_OVERRIDE).as_deref(),
            header(request, HEADER_LOCK).as_deref(),
            &body,
        )
        .await?;
        Ok(reply.into_response())
    }

    pub async fn file_action(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let headers = WopiHeaders {
            wopi_override: header(request, HEADER_OVERRIDE),
            lock: header(request, HEADER_LOCK),
            old_lock: header(request, HEADER_OLD_LOCK),
            requested_name: header(request, HEADER_REQUESTED_NAME),
        };
        let reply = actions::perform(
            &self.get_storage(request),
            &BlobStore::from_config(),
            &user,
            id,
            headers,
        )
        .await?;
        Ok(reply.into_response())
    }
}
