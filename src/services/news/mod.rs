pub mod find;
pub mod write;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ApiResponse;
use crate::models::news::requests::{CreateNewsRequest, NewsListParams, UpdateNewsRequest};
use crate::storage::Storage;

use super::current_user;

pub struct NewsService {
    storage: Option<Arc<dyn Storage>>,
}

impl NewsService {
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

    pub async fn create(
        &self,
        request: &HttpRequest,
        params: CreateNewsRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let news = write::create(self.get_storage(request), &user, params).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(news, "News created")))
    }

    pub async fn list(
        &self,
        request: &HttpRequest,
        params: NewsListParams,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let page = find::find_all_for_user(self.get_storage(request), &user, params).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(page, "News retrieved")))
    }

    pub async fn get(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let news = find::find_one_by_id_for_user(self.get_storage(request), id, &user).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(news, "News retrieved")))
    }

    pub async fn update(
        &self,
        request: &HttpRequest,
        id: i64,
        params: UpdateNewsRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let news = write::update(self.get_storage(request), id, &user, params).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(news, "News updated")))
    }

    pub async fn remove(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let removed = write::remove(self.get_storage(request), id, &user).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(removed, "News deleted")))
    }
}
