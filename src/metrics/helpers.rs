//! Metric helper functions

use prometheus::{Encoder, TextEncoder};

use super::{
    EMAILS_FAILED_TOTAL, EMAILS_SENT_TOTAL, EMAIL_DELIVERY_LATENCY, SEND_REJECTED_TOTAL,
};

/// Encode all registered metrics in Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording email metrics
pub struct EmailMetrics;

impl EmailMetrics {
    /// Record an email accepted by the mailer
    pub fn record_sent(backend: &str) {
        EMAILS_SENT_TOTAL.with_label_values(&[backend]).inc();
    }

    /// Record a mailer failure
    pub fn record_failed(backend: &str) {
        EMAILS_FAILED_TOTAL.with_label_values(&[backend]).inc();
    }

    /// Record a send request rejected before dispatch
    pub fn record_rejected(reason: &str) {
        SEND_REJECTED_TOTAL.with_label_values(&[reason]).inc();
    }

    /// Record time spent in the mailer
    pub fn observe_delivery(backend: &str, seconds: f64) {
        EMAIL_DELIVERY_LATENCY
            .with_label_values(&[backend])
            .observe(seconds);
    }
}
