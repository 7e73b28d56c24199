use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::render::{Letterhead, render_print_document};
use super::{ReportService, query::{custom_window, load_reports}};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode, reports::requests::CustomReportRequest};

pub async fn print_report(
    service: &ReportService,
    request: &HttpRequest,
    body: CustomReportRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let window = match custom_window(&body) {
        Ok(window) => window,
        Err(response) => return Ok(response),
    };
    let student_ids = body.student_id.map(|id| vec![id]);
    let reports = match load_reports(&storage, user.id, &window, body.standard, student_ids).await
    {
        Ok(reports) => reports,
        Err(response) => return Ok(response),
    };

    let html = render_print_document(&Letterhead::from_user(&user), &window, &reports);
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}
