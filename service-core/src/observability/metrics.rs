//! Process-wide recorder for the `metrics` facade used by
//! [`crate::middleware::metrics_middleware`].

use crate::error::AppError;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static RECORDER: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder once. Later calls return the same handle,
/// so building several applications in one process is fine.
pub fn init_http_metrics() -> Result<&'static PrometheusHandle, AppError> {
    RECORDER.get_or_try_init(|| {
        PrometheusBuilder::new().install_recorder().map_err(|e| {
            AppError::InternalError(anyhow::anyhow!(
                "Failed to install metrics recorder: {}",
                e
            ))
        })
    })
}

/// Text exposition of the HTTP metrics, empty when no recorder is installed.
pub fn render_http_metrics() -> String {
    RECORDER
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}
