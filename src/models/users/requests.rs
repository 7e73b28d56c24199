use super::entities::{InstituteProfile, UserRole};

// 创建用户（用于存储层，password 已经是哈希值）
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub institute: InstituteProfile,
}
