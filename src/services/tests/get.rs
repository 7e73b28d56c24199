use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TestService;
use crate::models::{ApiResponse, ErrorCode, tests::requests::TestCheckParams};
use crate::services::{current_user_id, error_response, not_found};

pub async fn get_test(
    service: &TestService,
    request: &HttpRequest,
    test_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match storage.get_test(user_id, test_id).await {
        Ok(Some(test)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(test, "Test retrieved successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::TestNotFound, "Test not found")),
        Err(e) => Ok(error_response(e)),
    }
}

// 按科目、章节、日期查找已存在的测验
pub async fn check_test(
    service: &TestService,
    request: &HttpRequest,
    query: TestCheckParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    match storage
        .find_test(
            user_id,
            query.subject.trim(),
            query.chapter.trim(),
            query.date,
        )
        .await
    {
        Ok(Some(test)) => Ok(HttpResponse::Ok().json(ApiResponse::success(test, "Test found"))),
        Ok(None) => Ok(not_found(ErrorCode::TestNotFound, "Test not found")),
        Err(e) => Ok(error_response(e)),
    }
}
