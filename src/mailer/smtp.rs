use std::time::Duration;

use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::{EmailMessage, Mailer};
use crate::config::SmtpConfig;
use crate::errors::{MarkSystemError, Result};

/// 基于 lettre 的 SMTP 发送器，连接池由 lettre 内部维护
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MarkSystemError::validation(format!("发件人地址无效: {e}")))?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        }
        .map_err(|e| MarkSystemError::mail_delivery(format!("SMTP 配置无效: {e}")))?;

        let mut builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout)));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait::async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        let to = Mailbox::new(
            Some(message.to_name.clone()),
            message
                .to_email
                .parse()
                .map_err(|e| MarkSystemError::validation(format!("收件人地址无效: {e}")))?,
        );

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html_body)
            .map_err(|e| MarkSystemError::mail_delivery(format!("构建邮件失败: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MarkSystemError::mail_delivery(format!("发送邮件失败: {e}")))?;

        debug!("Report email sent to {}", message.to_email);
        Ok(())
    }
}
