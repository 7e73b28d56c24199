use crate::config::AppConfig;
use crate::errors::MarkSystemError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use once_cell::sync::Lazy;

/// 用户不存在时用于比对的哈希，参数与真实账号一致，使两种失败耗时相同
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("marksystem-dummy-password").unwrap_or_default());

pub fn dummy_hash() -> &'static str {
    DUMMY_HASH.as_str()
}

/// 哈希密码（Argon2id）
pub fn hash_password(password: &str) -> Result<String, MarkSystemError> {
    let config = AppConfig::get();
    let params = Params::new(
        config.argon2.memory_cost,
        config.argon2.time_cost,
        config.argon2.parallelism,
        None,
    )
    .map_err(|e| MarkSystemError::validation(format!("Argon2 参数错误: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| MarkSystemError::validation(format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 验证密码，参数从哈希串本身读取
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_hash_never_matches_user_input() {
        assert!(dummy_hash().starts_with("$argon2id$"));
        assert!(!verify_password("Secret123", dummy_hash()));
        assert!(!verify_password("", dummy_hash()));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret123", &hash));
        assert!(!verify_password("secret123", &hash));
    }

    #[test]
    fn test_verify_rejects_plaintext_hash() {
        assert!(!verify_password("Secret123", "Secret123"));
    }
}
