use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{MarkService, check_score};
use crate::models::{ApiResponse, ErrorCode, marks::requests::MarkRequest};
use crate::services::{current_user_id, error_response, not_found};

pub async fn create_mark(
    service: &MarkService,
    request: &HttpRequest,
    mark: MarkRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    // 1. 学生和测验都必须属于当前用户
    match storage.get_student(user_id, mark.student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(error_response(e)),
    }
    let test = match storage.get_test(user_id, mark.test_id).await {
        Ok(Some(test)) => test,
        Ok(None) => return Ok(not_found(ErrorCode::TestNotFound, "Test not found")),
        Err(e) => return Ok(error_response(e)),
    };

    // 2. 分数范围
    if let Err(response) = check_score(&test, mark.marks_obtained) {
        return Ok(response);
    }

    // 3. 同一学生同一测验只能有一条成绩
    match storage.get_mark(mark.student_id, mark.test_id).await {
        Ok(Some(_)) => return Ok(mark_exists()),
        Ok(None) => {}
        Err(e) => return Ok(error_response(e)),
    }

    match storage.create_mark(mark).await {
        Ok(mark) => {
            Ok(HttpResponse::Created().json(ApiResponse::success(mark, "Mark created successfully")))
        }
        Err(e) if e.is_unique_violation() => Ok(mark_exists()),
        Err(e) => Ok(error_response(e)),
    }
}

fn mark_exists() -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::MarkAlreadyExists,
        "Marks for this student and test already exist",
    ))
}
