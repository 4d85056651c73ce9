use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::registration::requests::{
    HashRequest, RegistrationPinRequest, RegistrationRequest,
};
use crate::services::RegistrationService;

static REGISTRATION_SERVICE: Lazy<RegistrationService> =
    Lazy::new(RegistrationService::new_lazy);

pub async fn create_pin(
    req: HttpRequest,
    body: web::Json<RegistrationPinRequest>,
) -> ActixResult<HttpResponse> {
    REGISTRATION_SERVICE.create_pin(&req, body.into_inner()).await
}

pub async fn hash(req: HttpRequest, body: web::Json<HashRequest>) -> ActixResult<HttpResponse> {
    REGISTRATION_SERVICE.hash(&req, body.into_inner()).await
}

pub async fn prefill(req: HttpRequest, import_hash: web::Path<String>) -> ActixResult<HttpResponse> {
    REGISTRATION_SERVICE.prefill(&req, &import_hash).await
}

pub async fn register(
    req: HttpRequest,
    body: web::Json<RegistrationRequest>,
) -> ActixResult<HttpResponse> {
    REGISTRATION_SERVICE.register(&req, body.into_inner()).await
}

// 注册流程无需登录
pub fn configure_registration_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/registration")
            .route("", web::post().to(register))
            .route("/pins", web::post().to(create_pin))
            .route("/hash", web::post().to(hash))
            .route("/{import_hash}", web::get().to(prefill)),
    );
}
