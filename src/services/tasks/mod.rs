pub mod dashboard;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::SchulCloudError;
use crate::models::ApiResponse;
use crate::models::auth::permissions::Permission;
use crate::models::tasks::requests::TaskDashboardParams;
use crate::services::authorization::{NO_ACCESS, has_all, role_permissions};
use crate::storage::Storage;

use super::current_user;

pub struct TaskService {
    storage: Option<Arc<dyn Storage>>,
}

impl TaskService {
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

    /// 教师视图优先，否则为学生视图
    pub async fn dashboard(
        &self,
        request: &HttpRequest,
        params: TaskDashboardParams,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request);
        let granted = role_permissions(user.role);
        let pagination = params.pagination();

        let page = if has_all(granted, &[Permission::TaskDashboardTeacherView]) {
            dashboard::find_all_open_by_teacher(storage, &user, &pagination).await?
        } else if has_all(granted, &[Permission::TaskDashboardView]) {
            dashboard::find_all_open_for_student(storage, &user, &pagination).await?
        } else {
            return Err(SchulCloudError::authorization(NO_ACCESS).into());
        };

        Ok(HttpResponse::Ok().json(ApiResponse::success(page, "Tasks retrieved")))
    }
}
