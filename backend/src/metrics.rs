use actix_web::{get, HttpResponse, Responder};
use once_cell::sync::{Lazy, OnceCell};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Global metrics registry
static REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// Global metrics instance (set once at startup)
static METRICS: OnceCell<Arc<Metrics>> = OnceCell::new();

const NAMESPACE: &str = "card_admin";

/// HTTP request metrics
pub struct HttpMetrics {
    /// Request duration histogram (in seconds)
    pub request_duration: HistogramVec,
    pub requests_total: IntCounterVec,
    pub requests_in_flight: IntGauge,
}

/// Data source metrics
pub struct DataSourceMetrics {
    /// Statement round-trip histogram (in seconds)
    pub query_duration: HistogramVec,
    pub queries_total: IntCounterVec,
    /// Handles opened and not yet closed
    pub open_connections: IntGauge,
}

/// All application metrics
pub struct Metrics {
    pub http: HttpMetrics,
    pub data_source: DataSourceMetrics,
}

impl Metrics {
    /// Creates every metric and registers it with the global registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let request_duration = HistogramVec::new(
            HistogramOpts::new("request_duration_seconds", "HTTP request duration in seconds")
                .namespace(NAMESPACE)
                .subsystem("http"),
            &["method", "endpoint", "status_code"],
        )?;
        REGISTRY.register(Box::new(request_duration.clone()))?;

        let requests_total = IntCounterVec::new(
            Opts::new("requests_total", "Total number of HTTP requests")
                .namespace(NAMESPACE)
                .subsystem("http"),
            &["method", "endpoint", "status_code"],
        )?;
        REGISTRY.register(Box::new(requests_total.clone()))?;

        let requests_in_flight = IntGauge::with_opts(
            Opts::new("requests_in_flight", "Number of HTTP requests currently being processed")
                .namespace(NAMESPACE)
                .subsystem("http"),
        )?;
        REGISTRY.register(Box::new(requests_in_flight.clone()))?;

        let query_duration = HistogramVec::new(
            HistogramOpts::new("query_duration_seconds", "Data source statement duration in seconds")
                .namespace(NAMESPACE)
                .subsystem("data_source"),
            &["operation"],
        )?;
        REGISTRY.register(Box::new(query_duration.clone()))?;

        let queries_total = IntCounterVec::new(
            Opts::new("queries_total", "Total number of data source statements")
                .namespace(NAMESPACE)
                .subsystem("data_source"),
            &["operation", "status"],
        )?;
        REGISTRY.register(Box::new(queries_total.clone()))?;

        let open_connections = IntGauge::with_opts(
            Opts::new("open_connections", "Number of open data source handles")
                .namespace(NAMESPACE)
                .subsystem("data_source"),
        )?;
        REGISTRY.register(Box::new(open_connections.clone()))?;

        Ok(Metrics {
            http: HttpMetrics {
                request_duration,
                requests_total,
                requests_in_flight,
            },
            data_source: DataSourceMetrics {
                query_duration,
                queries_total,
                open_connections,
            },
        })
    }

    /// Get the Prometheus registry
    pub fn registry() -> Arc<Registry> {
        REGISTRY.clone()
    }

    /// Get the global metrics instance (if initialized)
    pub fn global() -> Option<Arc<Metrics>> {
        METRICS.get().cloned()
    }

    /// Installs metrics once and returns the global instance
    pub fn init_global() -> Result<Arc<Metrics>, prometheus::Error> {
        METRICS.get_or_try_init(|| Metrics::new().map(Arc::new)).cloned()
    }
}

pub fn record_http_request(
    metrics: &Metrics,
    method: &str,
    endpoint: &str,
    status_code: u16,
    duration: Duration,
) {
    let status_str = status_code.to_string();

    metrics
        .http
        .request_duration
        .with_label_values(&[method, endpoint, &status_str])
        .observe(duration.as_secs_f64());

    metrics
        .http
        .requests_total
        .with_label_values(&[method, endpoint, &status_str])
        .inc();
}

/// Records one data source statement; a no-op until metrics are installed
pub fn record_data_source_query(operation: &str, status: &str, duration: Duration) {
    let Some(metrics) = Metrics::global() else {
        return;
    };

    metrics
        .data_source
        .query_duration
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());

    metrics
        .data_source
        .queries_total
        .with_label_values(&[operation, status])
        .inc();
}

pub fn track_connection(opened: bool) {
    if let Some(metrics) = Metrics::global() {
        if opened {
            metrics.data_source.open_connections.inc();
        } else {
            metrics.data_source.open_connections.dec();
        }
    }
}

/// Prometheus text exposition of the global registry
#[get("/metrics")]
pub async fn metrics_handler() -> impl Responder {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        log::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
