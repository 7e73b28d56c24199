use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::future::join_all;

use super::render::{Letterhead, email_subject, render_email};
use super::{ReportService, ReportWindow, query::load_reports, today};
use crate::mailer::EmailMessage;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse, ErrorCode,
    reports::{
        requests::SendEmailsRequest,
        responses::{FailedDelivery, SendEmailsResponse},
    },
};
use crate::services::bad_request;

/// 给区间内有成绩的每个学生发送成绩邮件
///
/// 所有邮件并发发送，单封失败不影响其他邮件，失败明细随响应返回。
pub async fn send_emails(
    service: &ReportService,
    request: &HttpRequest,
    body: SendEmailsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let mailer = service.get_mailer(request)?;
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let window = match ReportWindow::for_period(body.period, body.from, body.to, today()) {
        Ok(window) => window,
        Err(msg) => return Ok(bad_request(ErrorCode::BadRequest, msg)),
    };

    let student_ids = body.student_ids.filter(|ids| !ids.is_empty());
    let reports = match load_reports(&storage, user.id, &window, body.standard, student_ids).await
    {
        Ok(reports) => reports,
        Err(response) => return Ok(response),
    };

    let letterhead = Letterhead::from_user(&user);
    let subject = email_subject(&letterhead, &window);

    let deliveries = reports.iter().map(|report| {
        let message = EmailMessage {
            to_name: report.name.clone(),
            to_email: report.email.clone(),
            subject: subject.clone(),
            html_body: render_email(&letterhead, &window, report),
        };
        let mailer = mailer.clone();
        async move { (report, mailer.send(message).await) }
    });

    let mut sent = 0;
    let mut failed = Vec::new();
    for (report, result) in join_all(deliveries).await {
        match result {
            Ok(()) => sent += 1,
            Err(e) => {
                tracing::warn!("Failed to email report to {}: {}", report.email, e);
                failed.push(FailedDelivery {
                    student_id: report.student_id,
                    email: report.email.clone(),
                    error: e.message().to_string(),
                });
            }
        }
    }

    tracing::info!(
        "User {} sent {} report emails, {} failed",
        user.id,
        sent,
        failed.len()
    );

    let all_failed = sent == 0 && !failed.is_empty();
    let response = SendEmailsResponse { sent, failed };
    if all_failed {
        Ok(HttpResponse::BadGateway().json(ApiResponse::error(
            ErrorCode::MailDeliveryFailed,
            response,
            "Failed to send report emails",
        )))
    } else {
        let message = if response.failed.is_empty() {
            format!("Sent {} report emails", response.sent)
        } else {
            format!(
                "Sent {} report emails, {} failed",
                response.sent,
                response.failed.len()
            )
        };
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, message)))
    }
}
