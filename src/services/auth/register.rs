use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::{
    ApiResponse, ErrorCode,
    auth::requests::RegisterRequest,
    users::{
        entities::{InstituteProfile, UserRole},
        requests::CreateUserRequest,
    },
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{
    validate_email, validate_institute_address, validate_institute_name, validate_password,
    validate_phone, validate_username,
};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 1. 表单校验
    if let Err(response) = validate_register_request(&register_request) {
        return Ok(response);
    }

    let username = register_request.username.trim().to_string();
    let email = register_request.email.trim().to_string();

    // 2. 检查用户名、邮箱是否已存在
    if let Err(response) = check_username_exists(&storage, &username).await {
        return Ok(response);
    }
    if let Err(response) = check_email_exists(&storage, &email).await {
        return Ok(response);
    }

    // 3. 哈希密码
    let password = register_request.password;
    let password_hash = match actix_web::web::block(move || hash_password(&password)).await {
        Ok(Ok(hash)) => hash,
        Ok(Err(e)) => {
            return Ok(register_failed(format!("Password hashing failed: {e}")));
        }
        Err(e) => {
            return Ok(register_failed(format!("Password hashing failed: {e}")));
        }
    };

    let create_request = CreateUserRequest {
        username,
        email,
        password: password_hash,
        role: register_request.role.unwrap_or(UserRole::Admin),
        institute: InstituteProfile {
            phone: Some(register_request.phone.trim().to_string()),
            institute_name: Some(register_request.institute_name.trim().to_string()),
            tagline: register_request
                .tagline
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            institute_address: Some(register_request.institute_address.trim().to_string()),
        },
    };

    // 4. 创建用户
    match storage.create_user(create_request).await {
        Ok(user) => {
            tracing::info!("Registered new user {}", user.username);
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "Registration successful")))
        }
        // 并发注册时由唯一索引兜底
        Err(e) if e.is_unique_violation() => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::Conflict, "Username or email already exists"),
        )),
        Err(e) => Ok(register_failed(format!("Register failed: {e}"))),
    }
}

fn validate_register_request(req: &RegisterRequest) -> Result<(), HttpResponse> {
    let invalid =
        |code, msg: String| HttpResponse::BadRequest().json(ApiResponse::error_empty(code, msg));

    validate_username(req.username.trim())
        .map_err(|msg| invalid(ErrorCode::UserNameInvalid, msg.to_string()))?;

    let password_check = validate_password(&req.password);
    if !password_check.is_valid {
        return Err(invalid(
            ErrorCode::UserPasswordInvalid,
            password_check.error_message(),
        ));
    }

    validate_email(req.email.trim())
        .map_err(|msg| invalid(ErrorCode::UserEmailInvalid, msg.to_string()))?;
    validate_phone(&req.phone)
        .map_err(|msg| invalid(ErrorCode::UserPhoneInvalid, msg.to_string()))?;
    validate_institute_name(req.institute_name.trim())
        .map_err(|msg| invalid(ErrorCode::InstituteInfoInvalid, msg.to_string()))?;
    validate_institute_address(req.institute_address.trim())
        .map_err(|msg| invalid(ErrorCode::InstituteInfoInvalid, msg.to_string()))?;
    Ok(())
}

fn register_failed(message: String) -> HttpResponse {
    tracing::error!("{}", message);
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(ErrorCode::RegisterFailed, message))
}

async fn check_username_exists(
    storage: &Arc<dyn Storage>,
    username: &str,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_username(username).await {
        Ok(Some(_)) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserNameAlreadyExists,
            "Username already exists",
        ))),
        Ok(None) => Ok(()),
        Err(e) => Err(register_failed(format!("Register failed: {e}"))),
    }
}

async fn check_email_exists(storage: &Arc<dyn Storage>, email: &str) -> Result<(), HttpResponse> {
    match storage.get_user_by_email(email).await {
        Ok(Some(_)) => Err(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::UserEmailAlreadyExists,
            "Email already exists",
        ))),
        Ok(None) => Ok(()),
        Err(e) => Err(register_failed(format!("Register failed: {e}"))),
    }
}
