pub mod login;
pub mod logout;
pub mod profile;
pub mod token;
pub mod whitelist;

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::errors::SchulCloudError;
use crate::models::ApiResponse;
use crate::models::auth::requests::LoginRequest;
use crate::storage::Storage;
use crate::utils::jwt::{Claims, JwtUtils};

use super::current_user;

pub struct AuthService {
    storage: Option<Arc<dyn Storage>>,
}

impl AuthService {
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

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> Arc<dyn ObjectCache> {
        request
            .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
            .expect("Cache not found in app data")
            .get_ref()
            .clone()
    }

    fn claims(request: &HttpRequest) -> Result<Claims, SchulCloudError> {
        request
            .extensions()
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| SchulCloudError::authentication("Not authenticated"))
    }

    // 登录
    pub async fn login(
        &self,
        request: &HttpRequest,
        body: LoginRequest,
    ) -> ActixResult<HttpResponse> {
        let outcome = login::login(
            &self.get_storage(request),
            &self.get_cache(request),
            body,
        )
        .await?;
        let cookie = JwtUtils::create_refresh_token_cookie(&outcome.refresh_token);
        Ok(HttpResponse::Ok()
            .cookie(cookie)
            .json(ApiResponse::success(outcome.response, "Login successful")))
    }

    // 刷新令牌
    pub async fn refresh_token(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let Some(refresh_token) = JwtUtils::extract_refresh_token_from_cookie(request) else {
            return Err(SchulCloudError::authentication("Unauthorized access, please login").into());
        };

        match token::refresh(
            &self.get_storage(request),
            &self.get_cache(request),
            &refresh_token,
        )
        .await
        {
            Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                response,
                "Token refreshed successfully",
            ))),
            Err(e) => {
                // 清除无效的 refresh token cookie
                let mut response = actix_web::ResponseError::error_response(&e);
                response.add_cookie(&JwtUtils::create_empty_refresh_token_cookie())?;
                Ok(response)
            }
        }
    }

    // 登出
    pub async fn logout(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let claims = request.extensions().get::<Claims>().cloned();
        logout::logout(&self.get_cache(request), claims.as_ref()).await;
        Ok(HttpResponse::Ok()
            .cookie(JwtUtils::create_empty_refresh_token_cookie())
            .json(ApiResponse::<()>::success_empty("Logout successful")))
    }

    // 当前用户信息
    pub async fn me(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            profile::me(user),
            "User information retrieved successfully",
        )))
    }

    pub async fn get_jwt_timer(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let claims = Self::claims(request)?;
        let timer = token::jwt_timer(&self.get_cache(request), &claims).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(timer, "JWT timer retrieved")))
    }

    pub async fn reset_jwt_timer(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let claims = Self::claims(request)?;
        let timer = token::reset_jwt_timer(&self.get_cache(request), &claims).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(timer, "JWT timer reset")))
    }
}
