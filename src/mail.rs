//! Outbound email behind a backend trait, with an async SMTP implementation.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::AppConfig;
use crate::error::ApiError;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, message: &str) -> Result<(), ApiError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::from_url(&config.smtp_url)
            .map_err(|e| ApiError::Unexpected(format!("invalid SMTP url: {}", e)))?
            .build();
        let from = config
            .mail_from
            .parse()
            .map_err(|e| ApiError::Unexpected(format!("invalid sender address: {}", e)))?;
        Ok(SmtpMailer { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, message: &str) -> Result<(), ApiError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| ApiError::Unexpected(format!("invalid recipient address: {}", e)))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.to_string())
            .map_err(|e| ApiError::Unexpected(format!("could not build email: {}", e)))?;
        self.transport
            .send(email)
            .await
            .map_err(|e| ApiError::Unexpected(format!("smtp send failed: {}", e)))?;
        Ok(())
    }
}
