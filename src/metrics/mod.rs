//! Prometheus metrics for the mail template service.
//!
//! This module provides metrics for monitoring:
//! - Email delivery (sent, failed, latency by mailer backend)
//! - Rejected send requests by reason
//! - Template creation and cache effectiveness

mod helpers;

pub use helpers::{encode_metrics, EmailMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "mail_template";

lazy_static! {
    // ============================================================================
    // Email Metrics
    // ============================================================================

    /// Emails accepted by the mailer, by backend
    pub static ref EMAILS_SENT_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_emails_sent_total", METRIC_PREFIX),
        "Total emails accepted by the mailer",
        &["backend"]
    ).unwrap();

    /// Emails the mailer failed to deliver, by backend
    pub static ref EMAILS_FAILED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_emails_failed_total", METRIC_PREFIX),
        "Total email delivery failures",
        &["backend"]
    ).unwrap();

    /// Send requests rejected before dispatch
    pub static ref SEND_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_send_rejected_total", METRIC_PREFIX),
        "Total send requests rejected before dispatch",
        &["reason"]
    ).unwrap();

    /// Time spent in the mailer per send
    pub static ref EMAIL_DELIVERY_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_email_delivery_latency_seconds", METRIC_PREFIX),
        "Email delivery latency in seconds",
        &["backend"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    // ============================================================================
    // Template Metrics
    // ============================================================================

    /// Templates created
    pub static ref TEMPLATES_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_templates_created_total", METRIC_PREFIX),
        "Total templates created"
    ).unwrap();

    /// Lookups served by the template cache
    pub static ref TEMPLATE_CACHE_HITS_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_cache_hits_total", METRIC_PREFIX),
        "Total template lookups served from cache"
    ).unwrap();

    /// Lookups that went to the backing repository
    pub static ref TEMPLATE_CACHE_MISSES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_cache_misses_total", METRIC_PREFIX),
        "Total template lookups that missed the cache"
    ).unwrap();
}
