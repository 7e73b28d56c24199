use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::mailer::{Mailer, create_mailer};
use crate::models::users::entities::{InstituteProfile, User, UserRole};
use crate::models::users::requests::CreateUserRequest;
use crate::storage::{Storage, create_storage};
use crate::utils::password::hash_password;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub mailer: Arc<dyn Mailer>,
}

const ADMIN_USERNAME: &str = "admin";

/// 随机密码，至少包含一个大写字母、一个小写字母和一个数字
fn generate_random_password(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    let mut password: String = [
        rng.random_range('A'..='Z'),
        rng.random_range('a'..='z'),
        rng.random_range('0'..='9'),
    ]
    .into_iter()
    .collect();
    while password.len() < length {
        password.push(CHARSET[rng.random_range(0..CHARSET.len())] as char);
    }
    password
}

/// 数据库中没有任何用户时创建默认管理员
///
/// 返回新建的账号；已有用户时返回 `None`。
async fn seed_admin(
    storage: &Arc<dyn Storage>,
    password: &str,
    email: String,
) -> Result<Option<User>> {
    let existing = storage.count_users().await?;
    if existing > 0 {
        debug!("{} user(s) present, skipping admin seed", existing);
        return Ok(None);
    }

    let user = storage
        .create_user(CreateUserRequest {
            username: ADMIN_USERNAME.to_string(),
            email,
            password: hash_password(password)?,
            role: UserRole::Admin,
            institute: InstituteProfile::default(),
        })
        .await?;
    Ok(Some(user))
}

/// 密码优先取 ADMIN_PASSWORD，未设置时生成并打印一次
fn admin_credentials() -> (String, String, bool) {
    let email = std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string());
    match std::env::var("ADMIN_PASSWORD") {
        Ok(password) if !password.is_empty() => (password, email, false),
        _ => (generate_random_password(16), email, true),
    }
}

/// 启动前准备：存储（含迁移）、默认管理员、邮件发送器
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，可以忽略
    let _ = rustls::crypto::ring::default_provider().install_default();

    let storage = create_storage().await?;
    info!("Storage ready, migrations applied");

    let (password, email, generated) = admin_credentials();
    match seed_admin(&storage, &password, email).await {
        Ok(Some(user)) => {
            info!("Created default admin account (ID: {})", user.id);
            if generated {
                warn!("ADMIN_PASSWORD is not set, generated password for '{}': {}", user.username, password);
                warn!("Save this password or set ADMIN_PASSWORD before the next start");
            }
        }
        Ok(None) => {}
        // 管理员创建失败不影响启动，机构仍可以自行注册
        Err(e) => warn!("Failed to create default admin account: {}", e),
    }

    let mailer = create_mailer()?;
    if AppConfig::get().smtp.enabled {
        info!("SMTP mailer ready");
    } else {
        warn!("SMTP disabled, report emails will only be logged");
    }

    Ok(StartupContext { storage, mailer })
}
