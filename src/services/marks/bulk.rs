use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{MarkService, check_mark_entries};
use crate::models::{
    ApiResponse, ErrorCode,
    marks::{requests::BulkMarksRequest, responses::BulkMarksResponse},
};
use crate::services::{bad_request, current_user_id, error_response, not_found};

/// 批量录入：已存在的成绩被更新，其余插入，全部在一个事务中完成
pub async fn bulk_upsert(
    service: &MarkService,
    request: &HttpRequest,
    body: BulkMarksRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    if body.marks.is_empty() {
        return Ok(bad_request(ErrorCode::BadRequest, "No marks provided"));
    }

    let test = match storage.get_test(user_id, body.test_id).await {
        Ok(Some(test)) => test,
        Ok(None) => return Ok(not_found(ErrorCode::TestNotFound, "Test not found")),
        Err(e) => return Ok(error_response(e)),
    };

    if let Err(response) = check_mark_entries(&storage, user_id, &test, &body.marks).await {
        return Ok(response);
    }

    let count = body.marks.len();
    match storage.upsert_marks(test.id, body.marks).await {
        Ok(marks) => {
            tracing::info!("Saved {} marks for test {}", count, test.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                BulkMarksResponse {
                    test_id: test.id,
                    marks,
                },
                "Marks saved successfully",
            )))
        }
        Err(e) => Ok(error_response(e)),
    }
}
