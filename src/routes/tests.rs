use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::tests::requests::{
    CreateTestRequest, CreateTestWithMarksRequest, TestCheckParams, TestListParams,
};
use crate::models::users::entities::UserRole;
use crate::services::TestService;
use crate::utils::{SafeIDI64, SafeUserIdI64};

// 懒加载的全局 TEST_SERVICE 实例
static TEST_SERVICE: Lazy<TestService> = Lazy::new(TestService::new_lazy);

pub async fn list_tests(
    req: HttpRequest,
    query: web::Query<TestListParams>,
) -> ActixResult<HttpResponse> {
    TEST_SERVICE.list_tests(&req, query.into_inner()).await
}

pub async fn list_tests_by_user(
    req: HttpRequest,
    user_id: SafeUserIdI64,
) -> ActixResult<HttpResponse> {
    TEST_SERVICE.list_tests_by_user(&req, user_id.0).await
}

pub async fn create_test(
    req: HttpRequest,
    test: web::Json<CreateTestRequest>,
) -> ActixResult<HttpResponse> {
    TEST_SERVICE.create_test(&req, test.into_inner()).await
}

pub async fn create_test_with_marks(
    req: HttpRequest,
    body: web::Json<CreateTestWithMarksRequest>,
) -> ActixResult<HttpResponse> {
    TEST_SERVICE
        .create_test_with_marks(&req, body.into_inner())
        .await
}

pub async fn check_test(
    req: HttpRequest,
    query: web::Query<TestCheckParams>,
) -> ActixResult<HttpResponse> {
    TEST_SERVICE.check_test(&req, query.into_inner()).await
}

pub async fn import_test(req: HttpRequest, payload: Multipart) -> ActixResult<HttpResponse> {
    TEST_SERVICE.import_test(&req, payload).await
}

pub async fn get_test(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    TEST_SERVICE.get_test(&req, id.0).await
}

pub async fn delete_test(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    TEST_SERVICE.delete_test(&req, id.0).await
}

// 配置路由，固定路径需要在 /{id} 之前注册
pub fn configure_tests_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/tests")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_tests))
                    .route(web::post().to(create_test)),
            )
            .route("/check", web::get().to(check_test))
            .route("/with-marks", web::post().to(create_test_with_marks))
            .route("/import", web::post().to(import_test))
            .route("/user/{user_id}", web::get().to(list_tests_by_user))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_test))
                    .route(web::delete().to(delete_test)),
            ),
    );
}
