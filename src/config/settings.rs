use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::validation::UnknownFieldPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub mailer: MailerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. Only used by the `postgres` template backend.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    /// Create the template tables on startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    /// `memory` or `postgres`
    #[serde(default = "default_templates_backend")]
    pub backend: String,
    /// Wrap the backend in a read-through cache
    #[serde(default)]
    pub cache_enabled: bool,
    /// Handling of extraData keys that the template does not declare
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,
    /// HTML-escape values inserted into email bodies
    #[serde(default = "default_true")]
    pub escape_html: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    /// `smtp`, `noop` or `memory`
    #[serde(default = "default_mailer_backend")]
    pub backend: String,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Use STARTTLS when talking to the relay
    #[serde(default)]
    pub tls: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_pool_size() -> u32 {
    10
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_templates_backend() -> String {
    "memory".to_string()
}

fn default_mailer_backend() -> String {
    "noop".to_string()
}

fn default_from_address() -> String {
    "no-reply@example.com".to_string()
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025 // Mailpit
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("templates.backend", default_templates_backend())?
            .set_default("mailer.backend", default_mailer_backend())?
            .set_default("logging.format", default_log_format())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT, APP__DATABASE__URL, APP__MAILER__SMTP_HOST, etc.
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
            connect_timeout_seconds: default_connect_timeout(),
            run_migrations: true,
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            backend: default_templates_backend(),
            cache_enabled: false,
            unknown_fields: UnknownFieldPolicy::Reject,
            escape_html: true,
        }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            backend: default_mailer_backend(),
            from_address: default_from_address(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            tls: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}
