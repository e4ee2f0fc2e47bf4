//! Outgoing mail.
//!
//! Sends through an SMTP relay when one is configured; otherwise messages are
//! written to the log so local setups can follow reset links.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use outliers_common::{AppError, AppResult, config::MailConfig};

#[derive(Clone)]
enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Log,
}

/// Mail service.
#[derive(Clone)]
pub struct MailService {
    transport: Transport,
    from: String,
}

impl MailService {
    /// Build the mail service from configuration.
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let transport = match &config.smtp_host {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                    .map_err(|e| AppError::Config(format!("Invalid SMTP relay {host}: {e}")))?;
                if let Some(port) = config.smtp_port {
                    builder = builder.port(port);
                }
                if let (Some(username), Some(password)) =
                    (&config.smtp_username, &config.smtp_password)
                {
                    builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
                }
                Transport::Smtp(builder.build())
            }
            None => Transport::Log,
        };

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    /// A mail service that only logs.
    #[must_use]
    pub fn log_only() -> Self {
        Self {
            transport: Transport::Log,
            from: "Outliers <no-reply@localhost>".to_string(),
        }
    }

    /// Whether mail actually leaves the process.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self.transport, Transport::Smtp(_))
    }

    /// Send a plain-text message.
    pub async fn send(&self, to: &str, subject: &str, body: String) -> AppResult<()> {
        match &self.transport {
            Transport::Log => {
                tracing::info!(to = %to, subject = %subject, body = %body, "Mail not sent (no SMTP relay configured)");
                Ok(())
            }
            Transport::Smtp(transport) => {
                let from: Mailbox = self
                    .from
                    .parse()
                    .map_err(|e| AppError::Config(format!("Invalid sender address: {e}")))?;
                let to_mailbox: Mailbox = to
                    .parse()
                    .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {e}")))?;

                let message = Message::builder()
                    .from(from)
                    .to(to_mailbox)
                    .subject(subject)
                    .header(ContentType::TEXT_PLAIN)
                    .body(body)
                    .map_err(|e| AppError::Mail(e.to_string()))?;

                transport
                    .send(message)
                    .await
                    .map_err(|e| AppError::Mail(e.to_string()))?;

                tracing::debug!(to = %to, subject = %subject, "Mail sent");
                Ok(())
            }
        }
    }

    /// Send a password reset link.
    pub async fn send_password_reset(&self, to: &str, link: &str) -> AppResult<()> {
        let body = format!(
            "We received a request to reset your password.\n\n\
             Open the link below to choose a new one:\n{link}\n\n\
             If you did not ask for this, you can ignore this message."
        );
        self.send(to, "Reset your password", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_only_accepts_messages() {
        let mail = MailService::new(&MailConfig::default()).unwrap();
        assert!(!mail.is_enabled());
        assert!(mail
            .send_password_reset("user@example.com", "https://example.com/reset-password?token=x")
            .await
            .is_ok());
    }
}
