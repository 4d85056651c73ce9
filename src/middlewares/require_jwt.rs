/*!
 * JWT 认证中间件
 *
 * 令牌取自 `Authorization: Bearer <token>`，WOPI 客户端则通过查询参数 `access_token` 传递。
 * 校验签名后还要求 `jwt:{user_id}:{jti}` 白名单条目仍然有效，最后加载未删除的用户。
 *
 * 通过后请求扩展中同时存放 `User` 与 `Claims`：
 *
 * ```rust,ignore
 * web::scope("/api")
 *     .wrap(RequireJWT)
 *     .route("/me", web::get().to(me));
 * ```
 */

use crate::cache::ObjectCache;
use crate::models::ErrorCode;
use crate::models::users::entities::User;
use crate::services::auth::whitelist;
use crate::storage::Storage;
use crate::utils::jwt::{Claims, JwtUtils};
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde::Deserialize;
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

#[derive(Deserialize)]
struct TokenQuery {
    access_token: Option<String>,
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    let header = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::to_string);

    header.or_else(|| {
        web::Query::<TokenQuery>::from_query(req.query_string())
            .ok()
            .and_then(|q| q.into_inner().access_token)
            .filter(|t| !t.is_empty())
    })
}

// 提取并验证 access token，返回当前用户与 claims
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<(User, Claims), String> {
    let token = extract_token(req)
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let claims = JwtUtils::verify_access_token(&token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .expect("Cache not found in app data")
        .get_ref()
        .clone();

    if whitelist::remaining(&cache, &claims.whitelist_key())
        .await
        .is_none()
    {
        return Err("Session expired".to_string());
    }

    let user_id = claims
        .user_id()
        .ok_or_else(|| "Invalid user ID in JWT".to_string())?;

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone();

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|_| "Failed to retrieve user from storage".to_string())?
        .filter(|user| !user.is_deleted())
        .ok_or_else(|| "User not found".to_string())?;

    Ok((user, claims))
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
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
        Box::pin(async move {
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req).await {
                Ok((user, claims)) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    req.extensions_mut().insert(claims);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::test_support::{seed_school, seed_user};
    use actix_web::{App, HttpRequest, HttpResponse, test};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        let id = req.extensions().get::<User>().map(|u| u.id).unwrap_or_default();
        let jti = req
            .extensions()
            .get::<Claims>()
            .map(|c| c.jti.clone())
            .unwrap_or_default();
        HttpResponse::Ok().body(format!("{id}:{jti}"))
    }

    #[actix_web::test]
    async fn test_whitelisted_token_is_accepted() {
        let storage = SeaOrmStorage::new_in_memory().await.unwrap();
        let school_id = seed_school(&storage, "Gymnasium").await;
        let user = seed_user(&storage, school_id, "max@gym.de", UserRole::Teacher).await;
        let storage: Arc<dyn Storage> = Arc::new(storage);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));

        let pair = JwtUtils::generate_token_pair(user.id, UserRole::TEACHER, school_id).unwrap();
        whitelist::register(&cache, user.id, &pair.jti).await;

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage.clone()))
                .app_data(web::Data::new(cache.clone()))
                .service(web::scope("/api").wrap(RequireJWT).route("/me", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, format!("{}:{}", user.id, pair.jti).as_bytes());

        // WOPI 客户端使用查询参数
        let req = test::TestRequest::get()
            .uri(&format!("/api/me?access_token={}", pair.access_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        whitelist::revoke(&cache, &crate::utils::jwt::whitelist_key(&user.id.to_string(), &pair.jti))
            .await;
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {}", pair.access_token)))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn test_missing_token_is_rejected() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(100, 60));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .app_data(web::Data::new(cache))
                .service(web::scope("/api").wrap(RequireJWT).route("/me", web::get().to(whoami))),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/me").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
