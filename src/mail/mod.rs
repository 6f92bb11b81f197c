//! Outgoing notification mail.
//!
//! `SmtpMailer` sends through the configured relay with `lettre`; when no
//! relay is configured `LogMailer` records the message in the log instead.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

/// A plain-text message ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// `None` when no SMTP host is configured.
    pub fn from_config(config: &MailConfig) -> Result<Option<Self>, MailError> {
        let Some(host) = config.smtp_host.as_deref() else {
            return Ok(None);
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?.port(config.smtp_port);
        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Some(Self {
            transport: builder.build(),
            from: config.from_address.parse()?,
        }))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(email.to.parse()?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(reply_to.parse()?);
        }

        let message = builder
            .body(email.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport.send(message).await?;
        tracing::info!(to = %email.to, subject = %email.subject, "Notification email sent");
        Ok(())
    }
}

/// Writes messages to the log. Used when SMTP is not configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            reply_to = email.reply_to.as_deref().unwrap_or(""),
            subject = %email.subject,
            "SMTP not configured, email logged only:\n{}",
            email.body
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn no_host_means_no_smtp_mailer() {
        let mut config = AppConfig::default().mail;
        config.smtp_host = None;
        assert!(SmtpMailer::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn bad_sender_is_rejected() {
        let mut config = AppConfig::default().mail;
        config.smtp_host = Some("smtp.example.com".to_string());
        config.from_address = "not-an-email".to_string();
        assert!(matches!(
            SmtpMailer::from_config(&config),
            Err(MailError::Address(_))
        ));
    }

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let email = OutgoingEmail {
            to: "admin@example.com".to_string(),
            reply_to: None,
            subject: "hello".to_string(),
            body: "body".to_string(),
        };
        LogMailer.send(&email).await.unwrap();
    }

    #[test]
    fn error_display() {
        let err = MailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
