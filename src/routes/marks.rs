use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::marks::requests::{BulkMarksRequest, MarkRequest};
use crate::models::users::entities::UserRole;
use crate::services::MarkService;
use crate::utils::{SafeStudentIdI64, SafeTestIdI64};

// 懒加载的全局 MARK_SERVICE 实例
static MARK_SERVICE: Lazy<MarkService> = Lazy::new(MarkService::new_lazy);

pub async fn list_marks(req: HttpRequest) -> ActixResult<HttpResponse> {
    MARK_SERVICE.list_marks(&req).await
}

pub async fn create_mark(
    req: HttpRequest,
    mark: web::Json<MarkRequest>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.create_mark(&req, mark.into_inner()).await
}

pub async fn update_mark(
    req: HttpRequest,
    mark: web::Json<MarkRequest>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.update_mark(&req, mark.into_inner()).await
}

pub async fn list_marks_by_student(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.list_marks_by_student(&req, student_id.0).await
}

pub async fn list_marks_by_test(
    req: HttpRequest,
    test_id: SafeTestIdI64,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.list_marks_by_test(&req, test_id.0).await
}

pub async fn bulk_upsert(
    req: HttpRequest,
    body: web::Json<BulkMarksRequest>,
) -> ActixResult<HttpResponse> {
    MARK_SERVICE.bulk_upsert(&req, body.into_inner()).await
}

// 配置路由
pub fn configure_marks_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/marks")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_marks))
                    .route(web::post().to(create_mark))
                    .route(web::put().to(update_mark)),
            )
            .route("/bulk", web::post().to(bulk_upsert))
            .route("/student/{student_id}", web::get().to(list_marks_by_student))
            .route("/test/{test_id}", web::get().to(list_marks_by_test)),
    );
}
