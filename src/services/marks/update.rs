use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{MarkService, check_score};
use crate::models::{ApiResponse, ErrorCode, marks::requests::MarkRequest};
use crate::services::{current_user_id, error_response, not_found};

pub async fn update_mark(
    service: &MarkService,
    request: &HttpRequest,
    mark: MarkRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    let test = match storage.get_test(user_id, mark.test_id).await {
        Ok(Some(test)) => test,
        Ok(None) => return Ok(mark_not_found()),
        Err(e) => return Ok(error_response(e)),
    };
    match storage.get_student(user_id, mark.student_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(mark_not_found()),
        Err(e) => return Ok(error_response(e)),
    }

    if let Err(response) = check_score(&test, mark.marks_obtained) {
        return Ok(response);
    }

    match storage
        .update_mark(mark.student_id, mark.test_id, mark.marks_obtained)
        .await
    {
        Ok(Some(mark)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(mark, "Mark updated successfully")))
        }
        Ok(None) => Ok(mark_not_found()),
        Err(e) => Ok(error_response(e)),
    }
}

fn mark_not_found() -> HttpResponse {
    not_found(ErrorCode::MarkNotFound, "Mark not found")
}
