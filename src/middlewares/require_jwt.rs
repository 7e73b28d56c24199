/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <token>`，从存储中加载令牌对应的机构用户并放入请求扩展。
 * 令牌缺失、无效、过期，或用户已被删除时返回 401。
 *
 * ```rust,ignore
 * web::scope("/api/students")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_students))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, StatusCode},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{fmt, rc::Rc, sync::Arc};

use super::create_error_response;
use crate::models::ErrorCode;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;

#[derive(Clone)]
pub struct RequireJWT;

/// 认证失败原因，直接作为 401 响应的提示
#[derive(Debug, PartialEq)]
enum AuthFailure {
    MissingToken,
    InvalidToken,
    UnknownUser,
    Backend,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            AuthFailure::MissingToken => "Missing or invalid Authorization header",
            AuthFailure::InvalidToken => "Invalid or expired token",
            AuthFailure::UnknownUser => "User not found",
            AuthFailure::Backend => "Failed to retrieve user",
        };
        f.write_str(text)
    }
}

async fn authenticate(req: &ServiceRequest) -> Result<User, AuthFailure> {
    let token =
        JwtUtils::extract_bearer_token(req.request()).ok_or(AuthFailure::MissingToken)?;
    let claims = JwtUtils::verify_token(&token).map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        AuthFailure::InvalidToken
    })?;
    let user_id = claims.user_id().ok_or(AuthFailure::InvalidToken)?;

    let Some(storage) = req.app_data::<web::Data<Arc<dyn Storage>>>() else {
        tracing::error!("Storage not found in app data");
        return Err(AuthFailure::Backend);
    };

    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(AuthFailure::UnknownUser),
        Err(e) => {
            tracing::error!("Failed to load user {} for token: {}", user_id, e);
            Err(AuthFailure::Backend)
        }
    }
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

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        Box::pin(async move {
            // 预检请求交给 CORS 处理
            if req.method() == Method::OPTIONS {
                return service.call(req).await.map(|res| res.map_into_left_body());
            }

            match authenticate(&req).await {
                Ok(user) => {
                    tracing::debug!("Authenticated user {}", user.id);
                    req.extensions_mut().insert(user);
                    service.call(req).await.map(|res| res.map_into_left_body())
                }
                Err(failure) => {
                    tracing::info!("Rejected request to {}: {}", req.path(), failure);
                    let response = create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        &format!("Unauthorized: {failure}"),
                    );
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

impl RequireJWT {
    /// 当前用户，只能在 RequireJWT 保护的路由中使用
    pub fn extract_user(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role.clone())
    }
}
