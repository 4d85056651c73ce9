pub mod groups;
pub mod run;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::ldap::{Ldap3Client, UniventionGroupUpdater};
use crate::models::ApiResponse;
use crate::models::schools::entities::CreateSystemRequest;
use crate::models::sync::requests::GroupUpdateRequest;
use crate::storage::Storage;
use crate::sync::SyncQueue;

/// 路由层已通过 RequirePermission 校验 SYNC_START
pub struct SyncService {
    storage: Option<Arc<dyn Storage>>,
}

impl SyncService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_queue(&self, request: &HttpRequest) -> Arc<dyn SyncQueue> {
        request
            .app_data::<web::Data<Arc<dyn SyncQueue>>>()
            .expect("Sync queue not found in app data")
            .get_ref()
            .clone()
    }

    pub async fn create_system(
        &self,
        request: &HttpRequest,
        body: CreateSystemRequest,
    ) -> ActixResult<HttpResponse> {
        let system = run::create_system(&self.get_storage(request), body).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(system, "System created")))
    }

    pub async fn run(&self, request: &HttpRequest, system_id: i64) -> ActixResult<HttpResponse> {
        let stats = run::run(
            &self.get_storage(request),
            Arc::new(Ldap3Client::from_config()),
            self.get_queue(request),
            system_id,
        )
        .await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(stats, "Sync messages emitted")))
    }

    pub async fn update_groups(
        &self,
        request: &HttpRequest,
        body: GroupUpdateRequest,
    ) -> ActixResult<HttpResponse> {
        let updater = UniventionGroupUpdater::from_config()?;
        let job = groups::update_groups(&self.get_storage(request), &updater, body).await?;
        Ok(HttpResponse::Accepted().json(ApiResponse::success(job, "Group update submitted")))
    }
}
