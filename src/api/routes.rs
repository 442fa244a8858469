use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::server::AppState;

use super::email::send_email;
use super::health::health;
use super::metrics::prometheus_metrics;
use super::template::{create_template, delete_template, find_formatted_template, list_templates};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/v1",
            Router::new()
                // Templates
                .route("/template", post(create_template).get(list_templates))
                .route("/template/formatted", get(find_formatted_template))
                .route("/template/{id}", delete(delete_template))
                // Email
                .route("/email", post(send_email)),
        )
}
