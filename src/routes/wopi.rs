use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::WopiService;
use crate::utils::SafeFileIdI64;

// 懒加载的全局 WopiService 实例
static WOPI_SERVICE: Lazy<WopiService> = Lazy::new(WopiService::new_lazy);

pub async fn check_file_info(req: HttpRequest, file_id: SafeFileIdI64) -> ActixResult<HttpResponse> {
    WOPI_SERVICE.check_file_info(&req, file_id.0).await
}

pub async fn file_action(req: HttpRequest, file_id: SafeFileIdI64) -> ActixResult<HttpResponse> {
    WOPI_SERVICE.file_action(&req, file_id.0).await
}

pub async fn get_file(req: HttpRequest, file_id: SafeFileIdI64) -> ActixResult<HttpResponse> {
    WOPI_SERVICE.get_file(&req, file_id.0).await
}

pub async fn put_file(
    req: HttpRequest,
    file_id: SafeFileIdI64,
    body: web::Bytes,
) -> ActixResult<HttpResponse> {
    WOPI_SERVICE.put_file(&req, file_id.0, body).await
}

// WOPI 客户端通过 access_token 查询参数认证
pub fn configure_wopi_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wopi/files/{file_id}")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(check_file_info))
            .route("", web::post().to(file_action))
            .route("/contents", web::get().to(get_file))
            .route("/contents", web::post().to(put_file)),
    );
}
