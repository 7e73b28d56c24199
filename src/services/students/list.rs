use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::models::{
    ApiResponse,
    students::{requests::StudentListParams, responses::StudentListResponse},
};
use crate::services::{current_user_id, ensure_same_user, error_response};

pub async fn list_students(
    service: &StudentService,
    request: &HttpRequest,
    query: StudentListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match storage.list_students(user_id, query).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            StudentListResponse { items },
            "Students retrieved successfully",
        ))),
        Err(e) => Ok(error_response(e)),
    }
}

pub async fn list_students_by_user(
    service: &StudentService,
    request: &HttpRequest,
    user_id: i64,
) -> ActixResult<HttpResponse> {
    let current = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };
    if let Err(response) = ensure_same_user(current, user_id) {
        return Ok(response);
    }

    list_students(service, request, StudentListParams::default()).await
}
