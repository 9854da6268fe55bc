//! Shared state across all handlers, mirroring the voice agent's `AppState`
//! pattern: configuration lives behind an `RwLock` for hot-reload, the
//! heavier collaborators are plain `Arc`s handed out by value.

use std::sync::Arc;

use llm_gateway_config::GatewaySettings;
use llm_gateway_dispatch::DispatchEngine;
use llm_gateway_repository::ModelRepository;
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;

/// `ModelDiscovery` and `ConnectivityProbe` are deliberately not carried
/// here: admin CRUD over `ModelRecord`s is out of scope (spec §1), so
/// nothing in this crate has a caller for them yet. They stay
/// library-level entry points in `llm-gateway-dispatch` for whatever
/// future admin surface wires them up.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<GatewaySettings>>,
    pub repository: Arc<dyn ModelRepository>,
    pub dispatch: Arc<DispatchEngine>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(
        config: GatewaySettings,
        repository: Arc<dyn ModelRepository>,
        dispatch: Arc<DispatchEngine>,
        metrics: PrometheusHandle,
    ) -> Self {
        Self { config: Arc::new(RwLock::new(config)), repository, dispatch, metrics }
    }

    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, GatewaySettings> {
        self.config.read()
    }
}
