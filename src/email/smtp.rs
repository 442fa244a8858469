//! SMTP delivery backed by lettre's async tokio transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::mailer::{MailError, Mailer, OutgoingEmail};
use crate::config::MailerConfig;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from)
            .field("transport", &"<AsyncSmtpTransport>")
            .finish()
    }
}

impl SmtpMailer {
    pub fn new(config: &MailerConfig) -> Result<Self, MailError> {
        let from = config.from_address.parse::<Mailbox>().map_err(|e| {
            MailError::Configuration(format!("invalid from address {}: {e}", config.from_address))
        })?;

        Ok(Self {
            transport: build_transport(config)?,
            from,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| MailError::Message(format!("invalid recipient: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|e| MailError::Message(e.to_string()))
    }
}

fn build_transport(config: &MailerConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
    let builder = if config.tls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Configuration(format!("SMTP TLS relay error: {e}")))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
    };

    let builder = builder.port(config.smtp_port);

    let builder = match (&config.username, &config.password) {
        (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
        _ => builder,
    };

    Ok(builder.build())
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_mail(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(email)?;

        self.transport.send(message).await.map_err(|e| {
            tracing::error!(
                error = %e,
                transient = e.is_transient(),
                permanent = e.is_permanent(),
                "SMTP send failed"
            );
            MailError::Transport(e.to_string())
        })?;

        tracing::debug!(to = %email.to, "Email accepted by SMTP relay");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "smtp"
    }
}
