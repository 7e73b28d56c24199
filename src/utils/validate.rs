use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s\-\(\)]{10,}$").expect("Invalid phone regex"));

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.trim().is_empty() {
        return Err("Username is required");
    }
    // 用户名长度校验：至少 3 个字符
    if username.chars().count() < 3 {
        return Err("Username must be at least 3 characters");
    }
    // 用户名格式校验：只能包含字母、数字、下划线
    if !USERNAME_RE.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err("Email is required");
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Please enter a valid email address");
    }
    Ok(())
}

/// 电话号码先去掉空白再校验
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if phone.trim().is_empty() {
        return Err("Phone number is required");
    }
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if !PHONE_RE.is_match(&compact) {
        return Err("Please enter a valid phone number");
    }
    Ok(())
}

pub fn validate_institute_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Institute name is required");
    }
    if name.chars().count() < 2 {
        return Err("Institute name must be at least 2 characters");
    }
    Ok(())
}

pub fn validate_institute_address(address: &str) -> Result<(), &'static str> {
    if address.trim().is_empty() {
        return Err("Institute address is required");
    }
    if address.chars().count() < 10 {
        return Err("Please enter a complete address");
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// 策略要求：
/// - 最小长度：8 字符
/// - 必须包含：大写字母 + 小写字母 + 数字
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.is_empty() {
        errors.push("Password is required");
    } else if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters");
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !password.is_empty() && !(has_upper && has_lower && has_digit) {
        errors.push("Password must contain uppercase, lowercase, and number");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// 非空文本字段校验
pub fn validate_required(value: &str, message: &'static str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        Err(message)
    } else {
        Ok(())
    }
}
