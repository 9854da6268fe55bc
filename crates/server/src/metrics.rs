//! Prometheus metrics, wired the way the voice agent wires
//! `init_metrics`/`metrics_handler` into its router — a process-lifetime
//! recorder installed once at startup, scraped over plain HTTP text.

use std::sync::Arc;

use axum::extract::State;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Installs the global Prometheus recorder and returns the handle the
/// `/metrics` route renders from.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new().install_recorder().expect("failed to install Prometheus recorder")
}

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}

/// Recorded once per `/v1/chat/completions` call, success or not — the
/// per-candidate outcomes inside dispatch already go to `tracing` (see
/// `DispatchEngine::log_attempt`); this is the caller-facing tally.
pub fn record_chat_request(stream: bool) {
    metrics::counter!("gateway_chat_requests_total", "stream" => stream.to_string()).increment(1);
}

pub fn record_chat_error(kind: &'static str) {
    metrics::counter!("gateway_chat_errors_total", "kind" => kind).increment(1);
}

/// A recorder built (not installed globally) for tests — `install_recorder`
/// sets the process-wide recorder once and panics on a second call, which
/// every `AppState`-constructing test would otherwise hit.
#[cfg(test)]
pub(crate) fn test_metrics_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build().expect("prometheus recorder builds without installing").1
}
