use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref PONDS_CREATED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "pond_ponds_created_total",
        "Total ponds created"
    ))
    .unwrap();
    pub static ref PONDS_DELETED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "pond_ponds_deleted_total",
        "Total ponds deleted"
    ))
    .unwrap();
    pub static ref SENSORS_ATTACHED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "pond_sensors_attached_total",
        "Total sensors attached or replaced"
    ))
    .unwrap();
    pub static ref READINGS_APPENDED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "pond_readings_appended_total",
        "Total readings appended to sensors"
    ))
    .unwrap();
    pub static ref NOT_FOUND_TOTAL: Counter = Counter::with_opts(Opts::new(
        "pond_not_found_total",
        "Total lookups answered with not found"
    ))
    .unwrap();
    pub static ref STORE_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "pond_store_failures_total",
        "Total failed store operations"
    ))
    .unwrap();
    pub static ref STORE_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "pond_store_latency_seconds",
            "Time taken by a single store operation"
        )
        .buckets(vec![
            0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0
        ])
    )
    .unwrap();
}

pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(PONDS_CREATED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(PONDS_DELETED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(SENSORS_ATTACHED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(READINGS_APPENDED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(NOT_FOUND_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORE_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(STORE_LATENCY_SECONDS.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
