use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::news::requests::{CreateNewsRequest, NewsListParams, UpdateNewsRequest};
use crate::services::NewsService;
use crate::utils::SafeIDI64;

static NEWS_SERVICE: Lazy<NewsService> = Lazy::new(NewsService::new_lazy);

pub async fn create_news(
    req: HttpRequest,
    body: web::Json<CreateNewsRequest>,
) -> ActixResult<HttpResponse> {
    NEWS_SERVICE.create(&req, body.into_inner()).await
}

pub async fn list_news(
    req: HttpRequest,
    query: web::Query<NewsListParams>,
) -> ActixResult<HttpResponse> {
    NEWS_SERVICE.list(&req, query.into_inner()).await
}

pub async fn get_news(req: HttpRequest, news_id: SafeIDI64) -> ActixResult<HttpResponse> {
    NEWS_SERVICE.get(&req, news_id.0).await
}

pub async fn update_news(
    req: HttpRequest,
    news_id: SafeIDI64,
    body: web::Json<UpdateNewsRequest>,
) -> ActixResult<HttpResponse> {
    NEWS_SERVICE.update(&req, news_id.0, body.into_inner()).await
}

pub async fn delete_news(req: HttpRequest, news_id: SafeIDI64) -> ActixResult<HttpResponse> {
    NEWS_SERVICE.remove(&req, news_id.0).await
}

// 权限在服务层按目标（学校或团队）检查
pub fn configure_news_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/news")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_news))
            .route("", web::post().to(create_news))
            .route("/{id}", web::get().to(get_news))
            .route("/{id}", web::patch().to(update_news))
            .route("/{id}", web::delete().to(delete_news)),
    );
}
