use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::errors::SchulCloudError;
use crate::middlewares;
use crate::models::users::requests::{
    AdminUserListParams, AdminUserPatch, AdminUserRequest, BulkDeleteParams,
};
use crate::services::UserService;
use crate::services::users::AdminUserKind;
use crate::utils::SafeIDI64;

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

fn admin_kind(req: &HttpRequest) -> ActixResult<AdminUserKind> {
    let raw = req.match_info().get("kind").unwrap_or_default();
    Ok(raw.parse::<AdminUserKind>()?)
}

pub async fn delete_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.delete_user(&req, user_id.0).await
}

pub async fn admin_list(
    req: HttpRequest,
    query: web::Query<AdminUserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .admin_list(&req, admin_kind(&req)?, query.into_inner())
        .await
}

pub async fn admin_find(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.admin_find(&req, admin_kind(&req)?, user_id.0).await
}

pub async fn admin_create(
    req: HttpRequest,
    body: web::Json<AdminUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .admin_create(&req, admin_kind(&req)?, body.into_inner())
        .await
}

pub async fn admin_replace(
    req: HttpRequest,
    user_id: SafeIDI64,
    body: web::Json<AdminUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .admin_replace(&req, admin_kind(&req)?, user_id.0, body.into_inner())
        .await
}

pub async fn admin_patch(
    req: HttpRequest,
    user_id: SafeIDI64,
    body: web::Json<AdminUserPatch>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .admin_patch(&req, admin_kind(&req)?, user_id.0, body.into_inner())
        .await
}

pub async fn admin_remove(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.admin_remove(&req, admin_kind(&req)?, user_id.0).await
}

pub async fn admin_remove_many(
    req: HttpRequest,
    query: web::Query<BulkDeleteParams>,
) -> ActixResult<HttpResponse> {
    if query.ids.trim().is_empty() {
        return Err(SchulCloudError::bad_request("Please provide ids to delete").into());
    }
    USER_SERVICE
        .admin_remove_many(&req, admin_kind(&req)?, &query.ids)
        .await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("/admin/{kind}")
                    .route("", web::get().to(admin_list))
                    .route("", web::post().to(admin_create))
                    .route("", web::delete().to(admin_remove_many))
                    .route("/{id}", web::get().to(admin_find))
                    .route("/{id}", web::put().to(admin_replace))
                    .route("/{id}", web::patch().to(admin_patch))
                    .route("/{id}", web::delete().to(admin_remove)),
            )
            .route("/{id}", web::delete().to(delete_user)),
    );
}
