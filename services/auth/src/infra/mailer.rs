//! Mail transports for verification codes.

use anyhow::Context as _;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::domain::repository::CodeMailer;
use crate::domain::types::CodeMessage;

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    /// 465 for implicit TLS, 587 for STARTTLS.
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: Option<String>,
}

/// Sends code emails through an authenticated SMTP relay.
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: String,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> anyhow::Result<Self> {
        let transport = SmtpTransport::relay(&settings.host)
            .context("create smtp transport")?
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .build();
        let from = match settings.from_name {
            Some(name) => format!("{name} <{}>", settings.from_email),
            None => settings.from_email,
        };
        tracing::info!(host = %settings.host, port = settings.port, "smtp mailer configured");
        Ok(Self { transport, from })
    }
}

impl CodeMailer for SmtpMailer {
    fn send(&self, message: &CodeMessage) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(self.from.parse().context("parse from address")?)
            .to(message.to.parse().context("parse recipient address")?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .context("build email")?;
        self.transport.send(&email).context("send email")?;
        Ok(())
    }
}

/// Development transport: writes the code to the log instead of sending it.
#[derive(Debug, Default)]
pub struct ConsoleMailer;

impl CodeMailer for ConsoleMailer {
    fn send(&self, message: &CodeMessage) -> anyhow::Result<()> {
        tracing::info!(
            to = %message.to,
            purpose = message.purpose.as_str(),
            code = %message.code,
            subject = %message.subject,
            "verification code (console mailer)"
        );
        Ok(())
    }
}
