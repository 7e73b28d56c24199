pub mod excel_marks;
pub mod extractor;
pub mod html;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod sql;
pub mod validate;

pub use extractor::{SafeIDI64, SafeStudentIdI64, SafeTestIdI64, SafeUserIdI64};
pub use html::escape_html;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;
