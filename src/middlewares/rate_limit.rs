/*!
 * 速率限制中间件
 *
 * 固定窗口计数：同一个键在窗口内超过上限后返回 429，并在 Retry-After 中给出窗口剩余秒数。
 * 未登录请求按客户端 IP 计数，已登录请求按用户 ID 计数。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::models::{ApiResponse, ErrorCode, users::entities::User};

/// 一个窗口内的计数
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    started: Instant,
    count: u32,
}

// 键: 前缀:标识
static COUNTERS: Lazy<Cache<String, WindowCounter>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(
            AppConfig::get().rate_limit.window_secs.max(1),
        ))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window: Duration,
    // 区分不同端点的计数
    key_prefix: &'static str,
    enabled: bool,
}

impl RateLimit {
    pub fn new(max_requests: u32, key_prefix: &'static str) -> Self {
        let config = &AppConfig::get().rate_limit;
        Self {
            max_requests,
            window: Duration::from_secs(config.window_secs.max(1)),
            key_prefix,
            enabled: config.enabled,
        }
    }

    pub fn login() -> Self {
        Self::new(AppConfig::get().rate_limit.login_max_requests, "login")
    }

    pub fn register() -> Self {
        Self::new(AppConfig::get().rate_limit.register_max_requests, "register")
    }

    /// 群发成绩邮件，按用户计数
    pub fn send_emails() -> Self {
        Self::new(AppConfig::get().rate_limit.email_max_requests, "email")
    }

    fn key_for(&self, req: &ServiceRequest) -> String {
        let user_id = req.extensions().get::<User>().map(|user| user.id);
        match user_id {
            Some(id) => format!("{}:user:{id}", self.key_prefix),
            None => format!("{}:ip:{}", self.key_prefix, client_ip(req)),
        }
    }

    /// 计数加一，返回本次请求后的计数器
    async fn hit(&self, key: String) -> WindowCounter {
        let window = self.window;
        COUNTERS
            .entry(key)
            .and_upsert_with(|existing| {
                let now = Instant::now();
                let next = match existing.map(|entry| entry.into_value()) {
                    Some(counter) if now.duration_since(counter.started) < window => {
                        WindowCounter {
                            started: counter.started,
                            count: counter.count.saturating_add(1),
                        }
                    }
                    _ => WindowCounter {
                        started: now,
                        count: 1,
                    },
                };
                std::future::ready(next)
            })
            .await
            .into_value()
    }

    fn retry_after(&self, counter: &WindowCounter) -> u64 {
        self.window
            .saturating_sub(counter.started.elapsed())
            .as_secs()
            .max(1)
    }
}

/// 客户端地址，反向代理需要设置 Forwarded 或 X-Forwarded-For
fn client_ip(req: &ServiceRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(|addr| {
            addr.parse::<std::net::SocketAddr>()
                .map(|socket| socket.ip().to_string())
                .unwrap_or_else(|_| addr.to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn too_many_requests(retry_after: u64) -> HttpResponse {
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            "Too many requests, please try again later",
        ))
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let limit = self.limit.clone();

        Box::pin(async move {
            if limit.enabled {
                let key = limit.key_for(&req);
                let counter = limit.hit(key.clone()).await;
                if counter.count > limit.max_requests {
                    tracing::warn!(
                        "Rate limit exceeded for {} ({}/{})",
                        key,
                        counter.count,
                        limit.max_requests
                    );
                    let response = too_many_requests(limit.retry_after(&counter));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }

            service.call(req).await.map(|res| res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{TestRequest, call_service, init_service};
    use actix_web::{App, web};

    #[test]
    fn test_presets_follow_config() {
        let config = &AppConfig::get().rate_limit;

        let login = RateLimit::login();
        assert_eq!(login.max_requests, config.login_max_requests);
        assert_eq!(login.key_prefix, "login");
        assert_eq!(
            RateLimit::register().window,
            Duration::from_secs(config.window_secs.max(1))
        );
        assert_eq!(RateLimit::send_emails().key_prefix, "email");
    }

    #[actix_web::test]
    async fn test_requests_over_limit_are_rejected() {
        let app = init_service(
            App::new()
                .wrap(RateLimit::new(2, "unit-test"))
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let peer: std::net::SocketAddr = "10.255.0.1:4000".parse().unwrap();
        let mut responses = Vec::new();
        for _ in 0..3 {
            let req = TestRequest::get().uri("/").peer_addr(peer).to_request();
            responses.push(call_service(&app, req).await);
        }

        if AppConfig::get().rate_limit.enabled {
            assert_eq!(responses[0].status(), StatusCode::OK);
            assert_eq!(responses[1].status(), StatusCode::OK);
            assert_eq!(responses[2].status(), StatusCode::TOO_MANY_REQUESTS);
            assert!(responses[2].headers().contains_key("retry-after"));
        }
    }

    #[actix_web::test]
    async fn test_counter_resets_after_window() {
        let limit = RateLimit {
            max_requests: 1,
            window: Duration::from_millis(50),
            key_prefix: "unit-window",
            enabled: true,
        };
        assert_eq!(limit.hit("unit-window:a".into()).await.count, 1);
        assert_eq!(limit.hit("unit-window:a".into()).await.count, 2);

        actix_web::rt::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(limit.hit("unit-window:a".into()).await.count, 1);
    }
}
