use once_cell::sync::Lazy;
use rocket_prometheus::prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

use crate::error::Result;

pub static BACKEND_HISTOGRAM: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("backend_request_seconds", "Backend request duration").buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ]),
        &["resource", "method"],
    )
    .expect("Failed to create backend histogram")
});

pub static BACKEND_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("backend_requests_count", "The number of backend requests"),
        &["resource", "method", "status"],
    )
    .expect("Failed to create backend counter")
});

pub fn register_backend_metrics(registry: &Registry) -> Result<()> {
    registry.register(Box::new(BACKEND_HISTOGRAM.clone()))?;
    registry.register(Box::new(BACKEND_REQUESTS.clone()))?;

    Ok(())
}

/// Records one finished backend call. `status` is the HTTP status code, or
/// `error` when no response came back.
pub fn observe_backend_call(resource: &str, method: &str, status: &str, elapsed_secs: f64) {
    BACKEND_HISTOGRAM
        .with_label_values(&[resource, method])
        .observe(elapsed_secs);
    BACKEND_REQUESTS
        .with_label_values(&[resource, method, status])
        .inc();
}
