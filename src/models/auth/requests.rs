use serde::Deserialize;
use ts_rs::TS;

use crate::models::users::entities::UserRole;

// 用户登录请求（来自HTTP请求）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    /// 用户名或邮箱
    pub username: String,
    /// 密码
    pub password: String,
}

// 机构注册请求，兼容注册页面的 insname / insaddress 字段名
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone: String,
    #[serde(alias = "insname")]
    pub institute_name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(alias = "insaddress")]
    pub institute_address: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}
