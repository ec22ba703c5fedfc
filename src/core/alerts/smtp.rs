// SMTP delivery over STARTTLS.

use std::path::PathBuf;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::notifier::Mailer;
use crate::core::config::{EmailSettings, EmailSettingsSource};
use crate::core::error::NotifyError;

/// Build the plain-text alert message from `sender_email` to `recipient_email`.
pub fn build_message(
    settings: &EmailSettings,
    subject: &str,
    body: &str,
) -> Result<Message, NotifyError> {
    let from: Mailbox = settings.sender_email.parse()?;
    let to: Mailbox = settings.recipient_email.parse()?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?;
    Ok(message)
}

/// Sends each alert through the server named in the email config.
///
/// Settings are looked up on every send (reloaded only when the file changed),
/// and a fresh connection is opened per message.
pub struct SmtpMailer {
    settings: EmailSettingsSource,
}

impl SmtpMailer {
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings: EmailSettingsSource::new(settings_path),
        }
    }
}

impl Mailer for SmtpMailer {
    async fn send(&mut self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let settings = self.settings.load()?;
        let message = build_message(&settings, subject, body)?;

        let credentials =
            Credentials::new(settings.sender_email.clone(), settings.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)?
            .port(settings.smtp_port)
            .credentials(credentials)
            .build();

        transport.send(message).await?;
        log::debug!(
            "Delivered alert to {} via {}:{}",
            settings.recipient_email,
            settings.smtp_server,
            settings.smtp_port
        );
        Ok(())
    }
}
