//! Telemetry: tracing subscriber setup and the Prometheus registry

mod metrics;
mod tracing_setup;

pub use metrics::Metrics;
pub use tracing_setup::{
    try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError,
};
