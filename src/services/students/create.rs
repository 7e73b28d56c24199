use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::models::{ApiResponse, ErrorCode, students::requests::CreateStudentRequest};
use crate::services::{bad_request, current_user_id, error_response};
use crate::utils::validate::{validate_email, validate_required};

pub async fn create_student(
    service: &StudentService,
    request: &HttpRequest,
    mut student: CreateStudentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let user_id = match current_user_id(request) {
        Ok(id) => id,
        Err(response) => return Ok(response),
    };

    student.name = student.name.trim().to_string();
    student.email = student.email.trim().to_string();
    student.standard = student.standard.trim().to_string();

    let check = validate_required(&student.name, "Student name is required")
        .and_then(|_| validate_email(&student.email))
        .and_then(|_| validate_required(&student.standard, "Standard is required"));
    if let Err(msg) = check {
        return Ok(bad_request(ErrorCode::StudentInvalid, msg));
    }

    match storage.create_student(user_id, student).await {
        Ok(student) => {
            tracing::info!("User {} created student {}", user_id, student.id);
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(student, "Student created successfully")))
        }
        Err(e) => Ok(error_response(e)),
    }
}
