//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_marksystem_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum MarkSystemError {
            $($variant(String),)*
        }

        impl MarkSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(MarkSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(MarkSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(MarkSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl MarkSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        MarkSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_marksystem_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    FileOperation("E004", "File Operation Error"),
    Validation("E005", "Validation Error"),
    NotFound("E006", "Resource Not Found"),
    Conflict("E007", "Resource Conflict"),
    Serialization("E008", "Serialization Error"),
    DateParse("E009", "Date Parse Error"),
    Authentication("E010", "Authentication Error"),
    Authorization("E011", "Authorization Error"),
    MailDelivery("E012", "Mail Delivery Error"),
    Spreadsheet("E013", "Spreadsheet Error"),
}

impl MarkSystemError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 写入失败时保留数据库错误类型：唯一约束冲突转为 Conflict
    pub fn from_db_write(context: &str, err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                MarkSystemError::Conflict(format!("{context}: {detail}"))
            }
            _ => MarkSystemError::DatabaseOperation(format!("{context}: {err}")),
        }
    }

    /// 是否为唯一约束冲突
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, MarkSystemError::Conflict(_))
    }
}

impl fmt::Display for MarkSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for MarkSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for MarkSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        MarkSystemError::from_db_write("数据库操作失败", err)
    }
}

impl From<std::io::Error> for MarkSystemError {
    fn from(err: std::io::Error) -> Self {
        MarkSystemError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for MarkSystemError {
    fn from(err: serde_json::Error) -> Self {
        MarkSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for MarkSystemError {
    fn from(err: chrono::ParseError) -> Self {
        MarkSystemError::DateParse(err.to_string())
    }
}

impl From<calamine::Error> for MarkSystemError {
    fn from(err: calamine::Error) -> Self {
        MarkSystemError::Spreadsheet(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for MarkSystemError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        MarkSystemError::Spreadsheet(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MarkSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(MarkSystemError::database_config("test").code(), "E001");
        assert_eq!(MarkSystemError::validation("test").code(), "E005");
        assert_eq!(MarkSystemError::authentication("test").code(), "E010");
        assert_eq!(MarkSystemError::mail_delivery("test").code(), "E012");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            MarkSystemError::not_found("test").error_type(),
            "Resource Not Found"
        );
        assert_eq!(
            MarkSystemError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = MarkSystemError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = MarkSystemError::spreadsheet("Sheet missing");
        let formatted = err.format_simple();
        assert!(formatted.contains("Spreadsheet Error"));
        assert!(formatted.contains("Sheet missing"));
    }

    #[test]
    fn test_unique_violation_detection() {
        // 只看错误分类，不再匹配错误文本
        let text_only = MarkSystemError::database_operation(
            "Execution Error: UNIQUE constraint failed: marks.student_id, marks.test_id",
        );
        assert!(!text_only.is_unique_violation());
        assert!(MarkSystemError::conflict("exists").is_unique_violation());
        assert!(!MarkSystemError::not_found("x").is_unique_violation());

        let other = MarkSystemError::from_db_write(
            "录入成绩失败",
            sea_orm::DbErr::Custom("connection reset".into()),
        );
        assert!(!other.is_unique_violation());
        assert!(other.message().contains("connection reset"));
    }
}
