//! Delivery backends.

use std::sync::Mutex;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use eatfast_core::config::MailConfig;
use eatfast_core::error::{AppError, ErrorKind};
use eatfast_core::result::AppResult;

use super::message::Notification;

/// Something that can deliver a [`Notification`].
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver one notification.
    async fn deliver(&self, notification: &Notification) -> AppResult<()>;
}

/// SMTP delivery through lettre, as multipart text and HTML.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    product_name: String,
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpNotifier {
    /// Builds the SMTP transport from mail configuration.
    pub fn new(config: &MailConfig) -> AppResult<Self> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        }
        .map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid SMTP relay host", e)
        })?
        .port(config.smtp_port);

        let builder = if config.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
        };

        let from = config.from.parse::<Mailbox>().map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid mail.from address", e)
        })?;

        Ok(Self {
            transport: builder.build(),
            from,
            product_name: config.product_name.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        let to = notification.recipient().parse::<Mailbox>().map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Invalid recipient address", e)
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject(&self.product_name))
            .multipart(MultiPart::alternative_plain_html(
                notification.text_body(&self.product_name),
                notification.html_body(&self.product_name),
            ))
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Failed to build email", e)
            })?;

        self.transport.send(message).await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Failed to send email", e)
        })?;

        info!(kind = notification.kind(), "Email sent");
        Ok(())
    }
}

/// Used when mail is disabled: records that a message would have been sent.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        info!(
            kind = notification.kind(),
            to = notification.recipient(),
            "Mail disabled, notification not sent"
        );
        Ok(())
    }
}

/// Keeps every delivered notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The most recent one-time code sent to `email`.
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent()
            .iter()
            .rev()
            .filter(|n| n.recipient() == email)
            .find_map(|n| n.code().map(str::to_string))
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, notification: &Notification) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_notifier_rejects_bad_from() {
        let config = MailConfig {
            from: "not an address".to_string(),
            ..MailConfig::default()
        };
        let err = SmtpNotifier::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_recording_notifier_finds_latest_code() {
        let recorder = RecordingNotifier::new();
        for code in ["111111", "222222"] {
            recorder
                .deliver(&Notification::LoginCode {
                    to: "jo@example.com".to_string(),
                    name: "Jo".to_string(),
                    code: code.to_string(),
                })
                .await
                .unwrap();
        }
        assert_eq!(recorder.sent().len(), 2);
        assert_eq!(recorder.last_code_for("jo@example.com").as_deref(), Some("222222"));
        assert_eq!(recorder.last_code_for("other@example.com"), None);
    }
}
