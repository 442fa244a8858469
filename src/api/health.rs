//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub templates: TemplatesHealthResponse,
    pub mailer: MailerHealthResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres: Option<PostgresHealthResponse>,
}

#[derive(Debug, Serialize)]
pub struct TemplatesHealthResponse {
    pub backend: String,
    pub cache_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct MailerHealthResponse {
    pub backend: String,
}

#[derive(Debug, Serialize)]
pub struct PostgresHealthResponse {
    pub status: String,
    pub connected: bool,
    pub pool_size: u32,
    pub idle_connections: u32,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let postgres = state.postgres_pool.as_ref().map(|pool| {
        let inner_pool = pool.pool();
        let connected = !inner_pool.is_closed();
        PostgresHealthResponse {
            status: if connected { "connected" } else { "closed" }.to_string(),
            connected,
            pool_size: inner_pool.size(),
            idle_connections: inner_pool.num_idle() as u32,
        }
    });

    let status = match &postgres {
        Some(pg) if !pg.connected => "degraded",
        _ => "healthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        templates: TemplatesHealthResponse {
            backend: state.templates.repository().backend_name().to_string(),
            cache_enabled: state.settings.templates.cache_enabled,
        },
        mailer: MailerHealthResponse {
            backend: state.email.mailer().backend_name().to_string(),
        },
        postgres,
    })
}
