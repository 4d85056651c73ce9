//! 客户端 API Key 校验
//!
//! 配置了 `app.client_api_key` 时，`/api/` 下的请求必须携带相同的 `x-api-key` 头。

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::warn;

use crate::config::AppConfig;
use crate::models::ErrorCode;

use super::create_error_response;

const API_KEY_HEADER: &str = "x-api-key";
const API_PREFIX: &str = "/api/";

#[derive(Clone, Default)]
pub struct RequireApiKey {
    /// 为 None 时读取配置
    key: Option<String>,
}

impl RequireApiKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireApiKey
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireApiKeyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let key = self
            .key
            .clone()
            .or_else(|| AppConfig::get().client_api_key().map(str::to_string));
        ready(Ok(RequireApiKeyMiddleware {
            service: Rc::new(service),
            key,
        }))
    }
}

pub struct RequireApiKeyMiddleware<S> {
    service: Rc<S>,
    key: Option<String>,
}

impl<S, B> Service<ServiceRequest> for RequireApiKeyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let expected = self.key.clone();

        Box::pin(async move {
            let Some(expected) = expected.filter(|_| req.path().starts_with(API_PREFIX)) else {
                return Ok(srv.call(req).await?.map_into_left_body());
            };

            let provided = req
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|h| h.to_str().ok());

            if provided == Some(expected.as_str()) {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            warn!(
                "Rejected request to {} from {:?}: invalid API key",
                req.path(),
                req.connection_info().realip_remote_addr()
            );
            Ok(req.into_response(
                create_error_response(
                    StatusCode::UNAUTHORIZED,
                    ErrorCode::ApiKeyInvalid,
                    "Invalid API key",
                )
                .map_into_right_body(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    #[actix_web::test]
    async fn test_api_key_is_required() {
        let app = test::init_service(
            App::new()
                .wrap(RequireApiKey::with_key("s3cret"))
                .route("/api/ping", web::get().to(|| async { HttpResponse::Ok().finish() }))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = test::TestRequest::get().uri("/ping").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/ping").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let req = test::TestRequest::get()
            .uri("/api/ping")
            .insert_header(("x-api-key", "s3cret"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
