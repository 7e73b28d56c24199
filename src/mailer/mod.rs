//! 邮件发送
//!
//! `Mailer` 是发送成绩报告邮件的抽象。`smtp.enabled = true` 时使用 lettre 的
//! 异步 SMTP 传输，否则使用只写日志的实现。

mod log_mailer;
mod smtp;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::Result;

pub use log_mailer::LogMailer;
pub use smtp::SmtpMailer;

/// 一封待发送的 HTML 邮件
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to_name: String,
    pub to_email: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

/// 按配置创建邮件发送器
pub fn create_mailer() -> Result<Arc<dyn Mailer>> {
    let config = AppConfig::get();
    if config.smtp.enabled {
        Ok(Arc::new(SmtpMailer::from_config(&config.smtp)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}
