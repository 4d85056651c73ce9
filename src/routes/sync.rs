use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::permissions::Permission;
use crate::models::schools::entities::CreateSystemRequest;
use crate::models::sync::requests::GroupUpdateRequest;
use crate::services::SyncService;
use crate::utils::SafeSystemIdI64;

static SYNC_SERVICE: Lazy<SyncService> = Lazy::new(SyncService::new_lazy);

pub async fn create_system(
    req: HttpRequest,
    body: web::Json<CreateSystemRequest>,
) -> ActixResult<HttpResponse> {
    SYNC_SERVICE.create_system(&req, body.into_inner()).await
}

pub async fn run_sync(req: HttpRequest, system_id: SafeSystemIdI64) -> ActixResult<HttpResponse> {
    SYNC_SERVICE.run(&req, system_id.0).await
}

pub async fn update_groups(
    req: HttpRequest,
    body: web::Json<GroupUpdateRequest>,
) -> ActixResult<HttpResponse> {
    SYNC_SERVICE.update_groups(&req, body.into_inner()).await
}

// 配置路由
pub fn configure_sync_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/sync")
            .wrap(middlewares::RequirePermission::new(&[Permission::SyncStart]))
            .wrap(middlewares::RequireJWT)
            .route("/systems", web::post().to(create_system))
            .route("/systems/{system_id}/run", web::post().to(run_sync))
            .route("/groups", web::post().to(update_groups)),
    );
}
