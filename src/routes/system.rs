use actix_web::{HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::SystemService;

static SYSTEM_SERVICE: Lazy<SystemService> = Lazy::new(SystemService::new_lazy);

pub async fn ping() -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.get_ping().await
}

pub async fn haproxy() -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.get_haproxy().await
}

// 健康检查，无需认证
pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ping", web::get().to(ping))
        .route("/system_info/haproxy", web::get().to(haproxy));
}
