use tracing::info;

use super::{EmailMessage, Mailer};
use crate::errors::Result;

/// 未启用 SMTP 时使用：只记录日志，不真正发送
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        info!(
            to = %message.to_email,
            subject = %message.subject,
            bytes = message.html_body.len(),
            "SMTP disabled, report email not sent"
        );
        Ok(())
    }
}
