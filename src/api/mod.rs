//! API layer - HTTP endpoint handlers organized by domain.

mod email;
mod health;
mod metrics;
mod params;
mod routes;
mod template;

// Re-export all handlers for use in server/app.rs
pub use email::send_email;
pub use health::health;
pub use metrics::prometheus_metrics;
pub use routes::api_routes;
pub use template::{create_template, delete_template, find_formatted_template, list_templates};
