//! PostgreSQL connection pool.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;

/// Errors that can occur with the PostgreSQL pool.
#[derive(Debug, Error)]
pub enum PostgresPoolError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("database.url is not configured")]
    MissingUrl,
}

/// PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresPool {
    /// The underlying connection pool
    pool: PgPool,

    /// Database URL (for logging purposes)
    database_url: String,
}

impl PostgresPool {
    /// Create a new PostgreSQL pool from configuration.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, PostgresPoolError> {
        let url = config.url.as_deref().ok_or(PostgresPoolError::MissingUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds as u64))
            .connect(url)
            .await?;

        tracing::info!(
            pool_size = config.pool_size,
            url = %mask_url(url),
            "PostgreSQL connection pool created"
        );

        Ok(Self {
            pool,
            database_url: url.to_string(),
        })
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the database URL (masked for logging).
    pub fn database_url_masked(&self) -> String {
        mask_url(&self.database_url)
    }

    /// Close the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL connection pool closed");
    }
}

/// Replace the password of a connection URL with `***`.
pub fn mask_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|pos| pos + 3) else {
        return url.to_string();
    };

    // Userinfo ends at the last '@' before the path
    let authority_end = url[scheme_end..]
        .find('/')
        .map_or(url.len(), |pos| scheme_end + pos);
    let Some(at_pos) = url[scheme_end..authority_end]
        .rfind('@')
        .map(|pos| scheme_end + pos)
    else {
        return url.to_string();
    };

    match url[scheme_end..at_pos].find(':') {
        Some(colon) => format!("{}***{}", &url[..scheme_end + colon + 1], &url[at_pos..]),
        None => url.to_string(),
    }
}
