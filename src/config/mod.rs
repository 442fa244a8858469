mod settings;

pub use settings::{
    DatabaseConfig, LoggingConfig, MailerConfig, ServerConfig, Settings, TemplatesConfig,
};
