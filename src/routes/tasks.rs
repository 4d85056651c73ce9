use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::tasks::requests::TaskDashboardParams;
use crate::services::TaskService;

static TASK_SERVICE: Lazy<TaskService> = Lazy::new(TaskService::new_lazy);

pub async fn dashboard(
    req: HttpRequest,
    query: web::Query<TaskDashboardParams>,
) -> ActixResult<HttpResponse> {
    TASK_SERVICE.dashboard(&req, query.into_inner()).await
}

pub fn configure_task_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/tasks")
            .wrap(middlewares::RequireJWT)
            .route("/dashboard", web::get().to(dashboard)),
    );
}
