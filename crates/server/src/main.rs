//! LLM Gateway Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use llm_gateway_adapters::AdapterRegistry;
use llm_gateway_client::UpstreamClient;
use llm_gateway_config::{load_settings, GatewaySettings};
use llm_gateway_dispatch::DispatchEngine;
use llm_gateway_repository::InMemoryModelRepository;
use llm_gateway_server::{create_router, init_metrics, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = std::env::var("GATEWAY_ENV").ok();
    let mut config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            eprintln!("Loaded configuration from files (env: {})", env.as_deref().unwrap_or("default"));
            settings
        }
        Err(e) => {
            eprintln!("Warning: failed to load config: {e}. Using defaults.");
            GatewaySettings::default()
        }
    };

    // §6's documented external interface is the flat `GATEWAY_PORT` env
    // var; the richer `GATEWAY__SERVER__PORT` layering above is this
    // crate's own ambient convention. Let the flat var win when set so
    // both surfaces agree with the spec.
    if let Ok(port) = std::env::var("GATEWAY_PORT") {
        if let Ok(port) = port.parse() {
            config.server.port = port;
        }
    }

    init_tracing(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting llm-gateway");

    let metrics_handle = init_metrics();
    tracing::info!("Prometheus metrics initialized at /metrics");

    // §1 places model-record persistence and admin CRUD out of scope;
    // the in-memory repository is the bundled reference implementation
    // behind `ModelRepository` — a real deployment swaps it for a
    // durable one without touching dispatch or the HTTP layer.
    let repository = Arc::new(InMemoryModelRepository::new());
    let client = Arc::new(UpstreamClient::new());
    let registry = AdapterRegistry;
    let dispatch = Arc::new(DispatchEngine::with_alert_threshold(
        repository.clone(),
        registry,
        client,
        config.dispatch.clone(),
        config.quota.alert_threshold,
    ));

    let state = Arc::new(AppState::new(config.clone(), repository, dispatch, metrics_handle));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

fn init_tracing(_config: &GatewaySettings) {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "llm_gateway=info,tower_http=info".into());

    let json = std::env::var("GATEWAY_LOG_JSON").map(|v| v == "1" || v == "true").unwrap_or(false);
    let fmt_layer = if json { tracing_subscriber::fmt::layer().json().boxed() } else { tracing_subscriber::fmt::layer().boxed() };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}
