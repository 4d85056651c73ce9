pub mod blob;
pub mod download;
pub mod permissions;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use std::sync::Arc;

use crate::models::ApiResponse;
use crate::models::files::{
    requests::{FileListParams, UploadParams},
    responses::{FileListResponse, FileUploadResponse},
};
use crate::storage::Storage;

use super::current_user;
use blob::BlobStore;

pub struct FileService {
    storage: Option<Arc<dyn Storage>>,
}

impl FileService {
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

    pub async fn upload(
        &self,
        request: &HttpRequest,
        params: UploadParams,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let file = upload::handle_upload(&self.get_storage(request), &user, params, payload).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(
            FileUploadResponse { file },
            "File uploaded successfully",
        )))
    }

    pub async fn download(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let (file, bytes) = download::download(
            &self.get_storage(request),
            &BlobStore::from_config(),
            &user,
            id,
        )
        .await?;

        Ok(HttpResponse::Ok()
            .insert_header((header::CONTENT_TYPE, file.file_type.as_str()))
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.name),
            ))
            .body(bytes))
    }

    pub async fn list(
        &self,
        request: &HttpRequest,
        params: FileListParams,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let items = download::list(
            &self.get_storage(request),
            &user,
            params.owner_model,
            params.owner_id,
            params.parent_id,
        )
        .await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            FileListResponse { items },
            "Files retrieved",
        )))
    }
}
