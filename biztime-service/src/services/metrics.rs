//! Prometheus metrics for biztime-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Company mutations by operation.
pub static COMPANY_OPERATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "biztime_company_operations_total",
        "Total number of company mutations by operation",
        &["operation"] // create, update, delete
    )
    .expect("Failed to register company_operations_total")
});

/// Invoice mutations by operation.
pub static INVOICE_OPERATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "biztime_invoice_operations_total",
        "Total number of invoice mutations by operation",
        &["operation"] // create, update, delete
    )
    .expect("Failed to register invoice_operations_total")
});

/// Paid-flag transitions applied by invoice updates.
pub static PAYMENT_TRANSITIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "biztime_payment_transitions_total",
        "Total number of invoice paid-flag transitions",
        &["transition"] // paid, unpaid, unchanged
    )
    .expect("Failed to register payment_transitions_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "biztime_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "biztime_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&COMPANY_OPERATIONS_TOTAL);
    Lazy::force(&INVOICE_OPERATIONS_TOTAL);
    Lazy::force(&PAYMENT_TRANSITIONS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
}

pub fn record_company_operation(operation: &str) {
    COMPANY_OPERATIONS_TOTAL
        .with_label_values(&[operation])
        .inc();
}

pub fn record_invoice_operation(operation: &str) {
    INVOICE_OPERATIONS_TOTAL
        .with_label_values(&[operation])
        .inc();
}

pub fn record_payment_transition(transition: &str) {
    PAYMENT_TRANSITIONS_TOTAL
        .with_label_values(&[transition])
        .inc();
}

pub fn record_error(error_type: &str) {
    ERRORS_TOTAL.with_label_values(&[error_type]).inc();
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
