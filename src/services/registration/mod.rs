pub mod hash;
pub mod pin;
pub mod register;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ApiResponse;
use crate::models::registration::requests::{
    HashRequest, RegistrationPinRequest, RegistrationRequest,
};
use crate::storage::Storage;

pub struct RegistrationService {
    storage: Option<Arc<dyn Storage>>,
}

impl RegistrationService {
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

    pub async fn create_pin(
        &self,
        request: &HttpRequest,
        body: RegistrationPinRequest,
    ) -> ActixResult<HttpResponse> {
        let pin = pin::create_pin(&self.get_storage(request), &body.email, body.silent).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(pin, "Registration pin created")))
    }

    pub async fn hash(&self, request: &HttpRequest, body: HashRequest) -> ActixResult<HttpResponse> {
        let hash = hash::hash(&self.get_storage(request), body).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(hash, "Hash created")))
    }

    pub async fn prefill(&self, request: &HttpRequest, import_hash: &str) -> ActixResult<HttpResponse> {
        let prefill = register::find_by_import_hash(&self.get_storage(request), import_hash).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(prefill, "Registration data retrieved")))
    }

    pub async fn register(
        &self,
        request: &HttpRequest,
        body: RegistrationRequest,
    ) -> ActixResult<HttpResponse> {
        let result = register::register(&self.get_storage(request), body).await?;
        Ok(HttpResponse::Created().json(ApiResponse::success(result, "Registration successful")))
    }
}
