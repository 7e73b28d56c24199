use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::MarkService;
use crate::models::{ApiResponse, ErrorCode, marks::responses::MarkListResponse};
use crate::services::{current_user_id, error_response, not_found};

pub async fn list_marks(service: &MarkService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match storage.list_marks(user_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MarkListResponse { items },
            "Marks retrieved successfully",
        ))),
        Err(e) => Ok(error_response(e)),
    }
}

pub async fn list_marks_by_student(
    service: &MarkService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    // 学生不属于当前用户时与没有成绩同样处理
    match storage.get_student(user_id, student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::MarkNotFound,
                "No marks found for this student",
            ));
        }
        Err(e) => return Ok(error_response(e)),
    }

    match storage.list_marks_by_student(student_id).await {
        Ok(items) if items.is_empty() => Ok(not_found(
            ErrorCode::MarkNotFound,
            "No marks found for this student",
        )),
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MarkListResponse { items },
            "Marks retrieved successfully",
        ))),
        Err(e) => Ok(error_response(e)),
    }
}

pub async fn list_marks_by_test(
    service: &MarkService,
    request: &HttpRequest,
    test_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match storage.get_test(user_id, test_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(not_found(
                ErrorCode::MarkNotFound,
                "No marks found for this test",
            ));
        }
        Err(e) => return Ok(error_response(e)),
    }

    match storage.list_marks_by_test(test_id).await {
        Ok(items) if items.is_empty() => Ok(not_found(
            ErrorCode::MarkNotFound,
            "No marks found for this test",
        )),
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            MarkListResponse { items },
            "Marks retrieved successfully",
        ))),
        Err(e) => Ok(error_response(e)),
    }
}
