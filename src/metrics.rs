//! Prometheus metrics recorder for the `/api/v1/metrics` endpoint.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Requests handled, total (counter, labels: method, path, status).
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Install the global Prometheus recorder.
///
/// Must be called once at startup before any metrics are recorded; the
/// returned handle renders the text exposition.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::debug!("prometheus metrics recorder installed");
    Ok(handle)
}
