use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::reports::requests::{
    CustomReportRequest, PeriodReportRequest, ReportPeriod, SendEmailsRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::ReportService;
use crate::utils::SafeStudentIdI64;

// 懒加载的全局 REPORT_SERVICE 实例
static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

pub async fn all_results(req: HttpRequest) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.all_results(&req).await
}

pub async fn student_result(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.student_result(&req, student_id.0).await
}

pub async fn custom_report(
    req: HttpRequest,
    body: web::Json<CustomReportRequest>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.custom_report(&req, body.into_inner()).await
}

// 请求体可以省略
pub async fn weekly_report(
    req: HttpRequest,
    body: Option<web::Json<PeriodReportRequest>>,
) -> ActixResult<HttpResponse> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    REPORT_SERVICE
        .period_report(&req, ReportPeriod::Weekly, body)
        .await
}

pub async fn monthly_report(
    req: HttpRequest,
    body: Option<web::Json<PeriodReportRequest>>,
) -> ActixResult<HttpResponse> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    REPORT_SERVICE
        .period_report(&req, ReportPeriod::Monthly, body)
        .await
}

pub async fn send_emails(
    req: HttpRequest,
    body: web::Json<SendEmailsRequest>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.send_emails(&req, body.into_inner()).await
}

pub async fn print_report(
    req: HttpRequest,
    body: web::Json<CustomReportRequest>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.print_report(&req, body.into_inner()).await
}

pub async fn export_report(
    req: HttpRequest,
    body: web::Json<CustomReportRequest>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.export_report(&req, body.into_inner()).await
}

// 配置路由
pub fn configure_reports_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/result")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .route("/{student_id}", web::get().to(student_result)),
    )
    .service(
        web::scope("/api/report")
            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(all_results))
            .route("/custom", web::post().to(custom_report))
            .route("/weekly", web::post().to(weekly_report))
            .route("/monthly", web::post().to(monthly_report))
            .route("/print", web::post().to(print_report))
            .route("/export", web::post().to(export_report))
            .service(
                web::resource("/send-emails")
                    .wrap(middlewares::RateLimit::send_emails())
                    .route(web::post().to(send_emails)),
            ),
    );
}
