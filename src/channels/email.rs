//! Email notifications over SMTP.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use crate::channels::traits::NotificationChannel;
use crate::config::EmailSettings;

/// Channel delivering reminders as plain-text email via an SMTP relay.
///
/// The connection is opened per send and upgraded with STARTTLS; channels
/// are stateless request-response, so nothing is kept alive between sends.
pub struct EmailChannel {
    settings: EmailSettings,
}

impl EmailChannel {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    fn is_configured(&self) -> bool {
        let s = &self.settings;
        ![&s.smtp_server, &s.email, &s.password, &s.recipient]
            .iter()
            .any(|field| field.trim().is_empty())
    }

    fn build_message(&self, title: &str, message: &str) -> anyhow::Result<Message> {
        let email = Message::builder()
            .from(self.settings.email.parse::<Mailbox>()?)
            .to(self.settings.recipient.parse::<Mailbox>()?)
            .subject(format!("LookAway Reminder: {title}"))
            .header(ContentType::TEXT_PLAIN)
            .body(compose_body(title, message))?;
        Ok(email)
    }
}

impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn send(&self, title: &str, message: &str) -> anyhow::Result<()> {
        if !self.is_configured() {
            anyhow::bail!(
                "email settings are incomplete (smtp server, address, password, and recipient are all required)"
            );
        }

        let email = self.build_message(title, message)?;
        let mailer = SmtpTransport::starttls_relay(&self.settings.smtp_server)?
            .port(self.settings.smtp_port)
            .credentials(Credentials::new(
                self.settings.email.clone(),
                self.settings.password.clone(),
            ))
            .build();

        debug!(
            "sending email via {}:{}",
            self.settings.smtp_server, self.settings.smtp_port
        );
        mailer.send(&email)?;
        Ok(())
    }

    fn test(&self) -> anyhow::Result<()> {
        self.send(
            "Test Notification",
            "Email notifications are working correctly!",
        )
    }
}

fn compose_body(title: &str, message: &str) -> String {
    format!(
        "\n{title}\n\n{message}\n\n---\nThis is an automated reminder from LookAway.\nTake care of your eyes! \u{1f440}\n"
    )
}
