//! Mailer that only logs.

use async_trait::async_trait;

use super::mailer::{MailError, Mailer, OutgoingEmail};

/// Skips delivery and logs the rendered email instead.
#[derive(Debug, Clone, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_mail(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Noop: skipping email delivery"
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "noop"
    }
}
