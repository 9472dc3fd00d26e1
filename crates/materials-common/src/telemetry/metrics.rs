//! Prometheus metrics for the materials service.
//!
//! Metric names follow `materials_<metric>_<unit>`. Request series are keyed
//! by a normalised route name; failed requests additionally count under
//! `<name>_error`.

use std::time::Duration;

use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};

/// Process-wide metrics registry, created once at startup and shared by handle
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    durations: HistogramVec,
    consumed: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("materials_requests_total", "Requests handled, by route"),
            &["name"],
        )?;
        let durations = HistogramVec::new(
            HistogramOpts::new(
                "materials_request_duration_ms",
                "Request handling time in milliseconds",
            )
            .buckets(exponential_buckets(1.0, 2.0, 14)?),
            &["name"],
        )?;
        let consumed = IntCounterVec::new(
            Opts::new("materials_consumed_total", "Bus messages handled, by outcome"),
            &["topic", "outcome"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(durations.clone()))?;
        registry.register(Box::new(consumed.clone()))?;

        Ok(Self {
            registry,
            requests,
            durations,
            consumed,
        })
    }

    /// Normalised series name for a request: `POST /api/materials/toggle-like`
    /// becomes `POST_api_materials_toggle_like`.
    pub fn metric_name(method: &str, path: &str) -> String {
        format!("{method}_{path}")
            .replace('/', "_")
            .trim_matches('_')
            .replace('-', "_")
    }

    pub fn observe_request(&self, name: &str, elapsed: Duration, failed: bool) {
        self.requests.with_label_values(&[name]).inc();
        if failed {
            let error_name = format!("{name}_error");
            self.requests
                .with_label_values(&[error_name.as_str()])
                .inc();
        }
        self.durations
            .with_label_values(&[name])
            .observe(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn observe_consumed(&self, topic: &str, outcome: &str) {
        self.consumed.with_label_values(&[topic, outcome]).inc();
    }

    /// Current value of a request counter, mostly for tests
    pub fn request_count(&self, name: &str) -> u64 {
        self.requests.with_label_values(&[name]).get()
    }

    /// Text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
