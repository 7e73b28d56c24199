pub mod auth;
pub mod common;
pub mod dashboard;
pub mod marks;
pub mod reports;
pub mod students;
pub mod tests;
pub mod users;

pub use common::ApiResponse;

/// 业务错误码，写入响应信封的 `code` 字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证与注册
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNameInvalid = 2002,
    UserEmailInvalid = 2003,
    UserPasswordInvalid = 2004,
    UserPhoneInvalid = 2005,
    InstituteInfoInvalid = 2006,
    UserNameAlreadyExists = 2007,
    UserEmailAlreadyExists = 2008,
    UserNotFound = 2009,

    // 学生
    StudentNotFound = 3000,
    StudentInvalid = 3001,

    // 测验
    TestNotFound = 4000,
    TestInvalid = 4001,

    // 成绩
    MarkNotFound = 5000,
    MarkAlreadyExists = 5001,
    MarkOutOfRange = 5002,

    // Excel 导入
    ImportFileParseFailed = 6000,
    ImportFileDataInvalid = 6001,
    ImportColumnNotFound = 6002,
    FileSizeExceeded = 6003,

    // 报表与邮件
    ReportEmpty = 7000,
    MailDeliveryFailed = 7001,
}
