//! Email delivery of summaries over SMTP with STARTTLS.

use std::time::Duration;

use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::summary::Summary;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("EMAIL_PORT must be a port number, got {0:?}")]
    InvalidPort(String),
    #[error("invalid email address: {0}")]
    Address(#[from] AddressError),
    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("failed to send email: {0}")]
    Send(String),
}

/// SMTP account used to send summaries
#[derive(Clone)]
pub struct MailSettings {
    pub address: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("address", &self.address)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl MailSettings {
    /// Read `EMAIL_ADDRESS`, `EMAIL_PASSWORD`, `EMAIL_HOST` and `EMAIL_PORT`
    pub fn from_env() -> Result<Self, EmailError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, EmailError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(EmailError::MissingVar(name))
        };

        let raw_port = var("EMAIL_PORT")?;
        let port = raw_port
            .trim()
            .parse::<u16>()
            .map_err(|_| EmailError::InvalidPort(raw_port.clone()))?;

        Ok(Self {
            address: var("EMAIL_ADDRESS")?,
            password: var("EMAIL_PASSWORD")?,
            host: var("EMAIL_HOST")?,
            port,
        })
    }
}

/// Build a single plain-text message from the configured account to `recipient`
pub fn build_message(
    settings: &MailSettings,
    recipient: &str,
    subject: &str,
    body: String,
) -> Result<Message, EmailError> {
    let from: Mailbox = settings.address.parse()?;
    let to: Mailbox = recipient.trim().parse()?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)?;
    Ok(message)
}

/// Hand one message to the transport
pub async fn deliver<T>(transport: &T, message: Message) -> Result<(), EmailError>
where
    T: AsyncTransport + Sync,
    T::Error: std::fmt::Display,
{
    transport
        .send(message)
        .await
        .map_err(|e| EmailError::Send(e.to_string()))?;
    Ok(())
}

/// STARTTLS relay authenticated with the configured account
fn transport(settings: &MailSettings) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        .map_err(|e| EmailError::Send(e.to_string()))?
        .port(settings.port)
        .credentials(Credentials::new(
            settings.address.clone(),
            settings.password.clone(),
        ))
        .timeout(Some(SMTP_TIMEOUT))
        .build();
    Ok(transport)
}

/// Email `summary` to `recipient` through the configured SMTP relay
pub async fn send_email(
    settings: &MailSettings,
    recipient: &str,
    summary: &Summary,
) -> Result<(), EmailError> {
    let subject = format!("Summary of {}", summary.url);
    let message = build_message(settings, recipient, &subject, summary.to_plain_text())?;

    deliver(&transport(settings)?, message).await?;
    info!(recipient, host = %settings.host, "summary emailed");
    Ok(())
}
