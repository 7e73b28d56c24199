use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::models::{ApiResponse, ErrorCode, students::requests::UpdateStudentRequest};
use crate::services::{bad_request, current_user_id, error_response, not_found};
use crate::utils::validate::{validate_email, validate_required};

pub async fn update_student(
    service: &StudentService,
    request: &HttpRequest,
    student_id: i64,
    update: UpdateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    let update = UpdateStudentRequest {
        name: update.name.map(|s| s.trim().to_string()),
        email: update.email.map(|s| s.trim().to_string()),
        standard: update.standard.map(|s| s.trim().to_string()),
    };

    // 只校验提供了的字段
    let check = update
        .name
        .as_deref()
        .map_or(Ok(()), |name| validate_required(name, "Student name is required"))
        .and_then(|_| update.email.as_deref().map_or(Ok(()), validate_email))
        .and_then(|_| {
            update
                .standard
                .as_deref()
                .map_or(Ok(()), |standard| validate_required(standard, "Standard is required"))
        });
    if let Err(msg) = check {
        return Ok(bad_request(ErrorCode::StudentInvalid, msg));
    }

    match storage.update_student(user_id, student_id, update).await {
        Ok(Some(student)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(student, "Student updated successfully"))),
        Ok(None) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(error_response(e)),
    }
}
