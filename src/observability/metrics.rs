//! # Metrics
//!
//! Prometheus metrics for monitoring the operator.
//!
//! ## Metrics Exposed
//!
//! - `b3scale_operator_reconciliations_total` - Total number of reconciliations
//! - `b3scale_operator_reconciliation_errors_total` - Total number of failed reconciliations
//! - `b3scale_operator_reconciliation_duration_seconds` - Duration of reconciliation runs
//! - `b3scale_operator_frontends_created_total` - Frontends created in b3scale
//! - `b3scale_operator_frontends_deleted_total` - Frontends deleted from b3scale
//! - `b3scale_operator_status_writes_total` - Ready condition writes performed
//! - `b3scale_operator_status_writes_skipped_total` - Ready condition writes skipped as unchanged
//! - `b3scale_operator_api_operations_total` - b3scale API calls by operation
//! - `b3scale_operator_api_operation_duration_seconds` - b3scale API call duration by operation
//! - `b3scale_operator_api_operation_errors_total` - Failed b3scale API calls by operation

use prometheus::{Histogram, HistogramVec, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "b3scale_operator_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "b3scale_operator_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "b3scale_operator_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static FRONTENDS_CREATED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "b3scale_operator_frontends_created_total",
        "Total number of frontends created in b3scale",
    )
    .expect("Failed to create FRONTENDS_CREATED_TOTAL metric - this should never happen")
});

static FRONTENDS_DELETED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "b3scale_operator_frontends_deleted_total",
        "Total number of frontends deleted from b3scale",
    )
    .expect("Failed to create FRONTENDS_DELETED_TOTAL metric - this should never happen")
});

static STATUS_WRITES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "b3scale_operator_status_writes_total",
        "Total number of Ready condition writes",
    )
    .expect("Failed to create STATUS_WRITES_TOTAL metric - this should never happen")
});

static STATUS_WRITES_SKIPPED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "b3scale_operator_status_writes_skipped_total",
        "Total number of Ready condition writes skipped because nothing changed",
    )
    .expect("Failed to create STATUS_WRITES_SKIPPED_TOTAL metric - this should never happen")
});

static API_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "b3scale_operator_api_operations_total",
            "Total number of b3scale API operations by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create API_OPERATIONS_TOTAL metric - this should never happen")
});

static API_OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "b3scale_operator_api_operation_duration_seconds",
            "Duration of b3scale API operations in seconds by operation",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 15.0]),
        &["operation"],
    )
    .expect("Failed to create API_OPERATION_DURATION metric - this should never happen")
});

static API_OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "b3scale_operator_api_operation_errors_total",
            "Total number of failed b3scale API operations by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create API_OPERATION_ERRORS_TOTAL metric - this should never happen")
});

/// Register all metrics with the registry
///
/// # Errors
/// Returns an error if a metric is registered twice.
pub fn register_metrics() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(FRONTENDS_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(FRONTENDS_DELETED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STATUS_WRITES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STATUS_WRITES_SKIPPED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(API_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(API_OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(API_OPERATION_ERRORS_TOTAL.clone()))?;

    Ok(())
}

/// Encode the registry in the Prometheus text exposition format
///
/// # Errors
/// Returns an error if encoding fails.
pub fn gather_text() -> Result<String, prometheus::Error> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(duration: f64) {
    RECONCILIATION_DURATION.observe(duration);
}

pub fn increment_frontends_created() {
    FRONTENDS_CREATED_TOTAL.inc();
}

pub fn increment_frontends_deleted() {
    FRONTENDS_DELETED_TOTAL.inc();
}

pub fn increment_status_writes() {
    STATUS_WRITES_TOTAL.inc();
}

pub fn increment_status_writes_skipped() {
    STATUS_WRITES_SKIPPED_TOTAL.inc();
}

pub fn record_api_operation(operation: &str, duration: f64) {
    API_OPERATIONS_TOTAL.with_label_values(&[operation]).inc();
    API_OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration);
}

pub fn increment_api_operation_errors(operation: &str) {
    API_OPERATIONS_TOTAL.with_label_values(&[operation]).inc();
    API_OPERATION_ERRORS_TOTAL
        .with_label_values(&[operation])
        .inc();
}
