//! Email rendering and dispatch.
//!
//! `EmailService` drives the send pipeline over a template repository and a
//! `Mailer`. Mailer backends are selected by `mailer.backend`.

mod factory;
mod mailer;
mod memory;
mod noop;
mod service;
mod smtp;

pub use factory::create_mailer;
pub use mailer::{MailError, Mailer, OutgoingEmail};
pub use memory::MemoryMailer;
pub use noop::NoopMailer;
pub use service::{send_email_schema, EmailService, SendEmailRequest, SendError};
pub use smtp::SmtpMailer;
