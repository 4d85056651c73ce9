/*!
 * 基于权限的访问控制中间件
 *
 * 必须在 RequireJWT 之后使用：当前用户角色的权限须包含全部所需权限。
 *
 * ```rust,ignore
 * web::scope("/api/news")
 *     .wrap(RequirePermission::new(&[Permission::NewsView]))
 *     .wrap(RequireJWT)
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::models::{ErrorCode, auth::permissions::Permission, users::entities::User};
use crate::services::authorization::{NO_ACCESS, has_all, role_permissions};

use super::create_error_response;

#[derive(Clone)]
pub struct RequirePermission {
    required: Vec<Permission>,
}

impl RequirePermission {
    pub fn new(required: &[Permission]) -> Self {
        Self {
            required: required.to_vec(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequirePermission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequirePermissionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequirePermissionMiddleware {
            service: Rc::new(service),
            required: self.required.clone(),
        }))
    }
}

pub struct RequirePermissionMiddleware<S> {
    service: Rc<S>,
    required: Vec<Permission>,
}

impl<S, B> Service<ServiceRequest> for RequirePermissionMiddleware<S>
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
        let required = self.required.clone();

        Box::pin(async move {
            let user = req.extensions().get::<User>().cloned();

            let Some(user) = user else {
                info!(
                    "Permission check failed: no user in request. Make sure RequireJWT middleware is applied first."
                );
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "Authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            if has_all(role_permissions(user.role), &required) {
                let res = srv.call(req).await?.map_into_left_body();
                return Ok(res);
            }

            info!(
                "Access denied for user {} (role: {}). Required permissions: {:?}",
                user.id,
                user.role.as_str(),
                required
            );
            Ok(req.into_response(
                create_error_response(StatusCode::FORBIDDEN, ErrorCode::Forbidden, NO_ACCESS)
                    .map_into_right_body(),
            ))
        })
    }
}
