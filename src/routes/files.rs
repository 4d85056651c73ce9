use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::files::requests::{FileListParams, UploadParams};
use crate::services::FileService;
use crate::utils::SafeIDI64;

// 懒加载的全局 FileService 实例
static FILE_SERVICE: Lazy<FileService> = Lazy::new(FileService::new_lazy);

pub async fn handle_upload(
    request: HttpRequest,
    params: web::Query<UploadParams>,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE
        .upload(&request, params.into_inner(), payload)
        .await
}

pub async fn handle_download(request: HttpRequest, file_id: SafeIDI64) -> ActixResult<HttpResponse> {
    FILE_SERVICE.download(&request, file_id.0).await
}

pub async fn list_files(
    request: HttpRequest,
    query: web::Query<FileListParams>,
) -> ActixResult<HttpResponse> {
    FILE_SERVICE.list(&request, query.into_inner()).await
}

// 配置路由
pub fn configure_file_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/files")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_files))
            .route("", web::post().to(handle_upload))
            .route("/{id}", web::get().to(handle_download)),
    );
}
