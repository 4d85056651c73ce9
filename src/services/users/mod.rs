pub mod admin;
pub mod delete;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ApiResponse;
use crate::models::users::requests::{AdminUserListParams, AdminUserPatch, AdminUserRequest};
use crate::storage::Storage;

use super::current_user;
pub use admin::AdminUserKind;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
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

    // 删除用户（墓碑化）
    pub async fn delete_user(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let result = delete::delete_user(&self.get_storage(request), &user, id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(result, "User deleted")))
    }

    pub async fn admin_list(
        &self,
        request: &HttpRequest,
        kind: AdminUserKind,
        params: AdminUserListParams,
    ) -> ActixResult<HttpResponse> {
        let admin = current_user(request)?;
        let page = admin::list(&self.get_storage(request), &admin, kind, params).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(page, "Users retrieved")))
    }

    pub async fn admin_find(
        &self,
        request: &HttpRequest,
        kind: AdminUserKind,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        let admin = current_user(request)?;
        let item = admin::find(&self.get_storage(request), &admin, kind, id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(item, "User retrieved")))
    }

    pub async fn admin_create(
        &self,
        request: &HttpRequest,
        kind: AdminUserKind,
        body: AdminUserRequest,
    ) -> ActixResult<HttpResponse> {
        let admin = current_user(request)?;
        let user = admin::create(&self.get_storage(request), &admin, kind, body).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(user, "User created")))
    }

    pub async fn admin_replace(
        &self,
        request: &HttpRequest,
        kind: AdminUserKind,
        id: i64,
        body: AdminUserRequest,
    ) -> ActixResult<HttpResponse> {
        let admin = current_user(request)?;
        let user = admin::replace(&self.get_storage(request), &admin, kind, id, body).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(user, "User updated")))
    }

    pub async fn admin_patch(
        &self,
        request: &HttpRequest,
        kind: AdminUserKind,
        id: i64,
        body: AdminUserPatch,
    ) -> ActixResult<HttpResponse> {
        let admin = current_user(request)?;
        let user = admin::update(&self.get_storage(request), &admin, kind, id, body).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(user, "User updated")))
    }

    pub async fn admin_remove(
        &self,
        request: &HttpRequest,
        kind: AdminUserKind,
        id: i64,
    ) -> ActixResult<HttpResponse> {
        let admin = current_user(request)?;
        let result = admin::remove(&self.get_storage(request), &admin, kind, id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(result, "User deleted")))
    }

    pub async fn admin_remove_many(
        &self,
        request: &HttpRequest,
        kind: AdminUserKind,
        ids: &str,
    ) -> ActixResult<HttpResponse> {
        let admin = current_user(request)?;
        let result = admin::remove_many(&self.get_storage(request), &admin, kind, ids).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(result, "Users deleted")))
    }
}
