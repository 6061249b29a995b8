//! Telemetry module
//!
//! Logging and metrics

mod logging;
mod metrics;

pub use self::logging::{init_logging, LogFormat};
pub use self::metrics::{increment, init_metrics_exporter, record_latency, CounterMetric, LatencyMetric};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_format)?;

    if let Some(port) = config.metrics_port {
        init_metrics_exporter(port)?;
    }

    Ok(())
}
