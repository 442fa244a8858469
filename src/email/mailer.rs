//! Mail transport abstraction.
//!
//! Implementations:
//! - `SmtpMailer`: delivery through an SMTP relay using lettre
//! - `NoopMailer`: logs and discards (local development)
//! - `MemoryMailer`: records messages in memory (tests)

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A fully rendered email, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    /// The transport or sender configuration is unusable
    #[error("Mailer configuration error: {0}")]
    Configuration(String),

    /// The message could not be assembled (bad address, header)
    #[error("Failed to build email: {0}")]
    Message(String),

    /// The relay refused the message or could not be reached
    #[error("Failed to deliver email: {0}")]
    Transport(String),
}

/// Sends rendered emails. One attempt per call, no retries.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_mail(&self, email: &OutgoingEmail) -> Result<(), MailError>;

    /// Backend identifier (e.g. `"smtp"`, `"noop"`).
    fn backend_name(&self) -> &'static str;
}
