//! Mailer factory

use std::sync::Arc;

use crate::config::MailerConfig;

use super::mailer::{MailError, Mailer};
use super::memory::MemoryMailer;
use super::noop::NoopMailer;
use super::smtp::SmtpMailer;

/// Create a mailer based on configuration.
///
/// - `"smtp"`: `SmtpMailer`; fails if the sender address or relay settings are invalid
/// - `"memory"`: `MemoryMailer`
/// - `"noop"` (default): `NoopMailer`
pub fn create_mailer(config: &MailerConfig) -> Result<Arc<dyn Mailer>, MailError> {
    let mailer: Arc<dyn Mailer> = match config.backend.as_str() {
        "smtp" => {
            tracing::info!(
                backend = "smtp",
                host = %config.smtp_host,
                port = config.smtp_port,
                tls = config.tls,
                "Creating SMTP mailer"
            );
            Arc::new(SmtpMailer::new(config)?)
        }
        "memory" => {
            tracing::info!(backend = "memory", "Creating in-memory mailer");
            Arc::new(MemoryMailer::new())
        }
        "noop" => {
            let run_mode = std::env::var("RUN_MODE").ok();
            if is_development(run_mode.as_deref()) {
                tracing::info!(backend = "noop", "Creating noop mailer, emails will not be delivered");
            } else {
                tracing::warn!(
                    backend = "noop",
                    run_mode = run_mode.as_deref().unwrap_or_default(),
                    "Noop mailer active outside development, emails will not be delivered"
                );
            }
            Arc::new(NoopMailer)
        }
        other => {
            tracing::warn!(backend = %other, "Unknown mailer backend, falling back to noop");
            Arc::new(NoopMailer)
        }
    };

    Ok(mailer)
}

/// `RUN_MODE` unset means development, matching `Settings::new`.
fn is_development(run_mode: Option<&str>) -> bool {
    matches!(run_mode, None | Some("development") | Some("dev"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: &str) -> MailerConfig {
        MailerConfig {
            backend: backend.to_string(),
            ..MailerConfig::default()
        }
    }

    #[test]
    fn test_backends() {
        assert_eq!(create_mailer(&config("noop")).unwrap().backend_name(), "noop");
        assert_eq!(create_mailer(&config("memory")).unwrap().backend_name(), "memory");
        assert_eq!(create_mailer(&config("carrier-pigeon")).unwrap().backend_name(), "noop");
    }

    #[test]
    fn test_noop_warning_outside_development() {
        assert!(is_development(None));
        assert!(is_development(Some("development")));
        assert!(!is_development(Some("production")));
        assert!(!is_development(Some("staging")));
    }

    #[tokio::test]
    async fn test_smtp_backend() {
        assert_eq!(create_mailer(&config("smtp")).unwrap().backend_name(), "smtp");
    }
}
