use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::{ReportService, ReportWindow, today};
use crate::models::{
    ApiResponse, ErrorCode,
    reports::{
        entities::{ReportSummary, StudentReport, group_by_student},
        requests::{CustomReportRequest, PeriodReportRequest, ReportPeriod, ReportQuery},
        responses::{ReportResponse, StudentResultResponse},
    },
};
use crate::services::{bad_request, current_user_id, error_response, not_found};
use crate::storage::Storage;

/// 查询并按学生分组，没有数据时返回带区间提示的 404
pub(crate) async fn load_reports(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    window: &ReportWindow,
    standard: Option<String>,
    student_ids: Option<Vec<i64>>,
) -> Result<Vec<StudentReport>, HttpResponse> {
    let query = ReportQuery {
        from: window.from,
        to: window.to,
        standard: standard
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        student_ids,
    };

    let rows = storage
        .report_rows(user_id, query)
        .await
        .map_err(error_response)?;
    if rows.is_empty() {
        return Err(not_found(ErrorCode::ReportEmpty, window.empty_message));
    }
    Ok(group_by_student(rows))
}

/// 自定义区间请求转为查询窗口
pub(crate) fn custom_window(body: &CustomReportRequest) -> Result<ReportWindow, HttpResponse> {
    ReportWindow::custom(body.from, body.to).map_err(|msg| bad_request(ErrorCode::BadRequest, msg))
}

fn report_response(window: &ReportWindow, students: Vec<StudentReport>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        ReportResponse {
            title: window.title.to_string(),
            from: window.from,
            to: window.to,
            students,
        },
        "Report generated successfully",
    ))
}

pub async fn all_results(
    service: &ReportService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    let window = ReportWindow::all();
    match load_reports(&storage, user_id, &window, None, None).await {
        Ok(students) => Ok(report_response(&window, students)),
        Err(response) => Ok(response),
    }
}

pub async fn student_result(
    service: &ReportService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    let student = match storage.get_student(user_id, student_id).await {
        Ok(Some(student)) => student,
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(error_response(e)),
    };

    let query = ReportQuery {
        student_ids: Some(vec![student_id]),
        ..Default::default()
    };
    match storage.report_rows(user_id, query).await {
        Ok(rows) if rows.is_empty() => Ok(not_found(
            ErrorCode::ReportEmpty,
            "No results found for this student",
        )),
        Ok(rows) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentResultResponse {
                student,
                summary: ReportSummary::from_rows(&rows),
                rows,
            },
            "Results retrieved successfully",
        ))),
        Err(e) => Ok(error_response(e)),
    }
}

pub async fn custom_report(
    service: &ReportService,
    request: &HttpRequest,
    body: CustomReportRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    let window = match custom_window(&body) {
        Ok(window) => window,
        Err(response) => return Ok(response),
    };
    let student_ids = body.student_id.map(|id| vec![id]);

    match load_reports(&storage, user_id, &window, body.standard, student_ids).await {
        Ok(students) => Ok(report_response(&window, students)),
        Err(response) => Ok(response),
    }
}

pub async fn period_report(
    service: &ReportService,
    request: &HttpRequest,
    period: ReportPeriod,
    body: PeriodReportRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    let window = match ReportWindow::for_period(period, None, None, today()) {
        Ok(window) => window,
        Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
    };

    match load_reports(&storage, user_id, &window, body.standard, None).await {
        Ok(students) => Ok(report_response(&window, students)),
        Err(response) => Ok(response),
    }
}
