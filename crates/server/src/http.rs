//! The HTTP surface (§6): `POST /v1/chat/completions`, `GET /v1/models`,
//! plus the ambient `/health`, `/ready`, `/metrics` endpoints the voice
//! agent's own router always carries alongside its domain routes.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use futures::StreamExt;
use llm_gateway_core::StandardRequest;
use llm_gateway_dispatch::DispatchOutput;
use llm_gateway_repository::ModelFilter;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::error::ServerError;
use crate::metrics::metrics_handler;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer();

    Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/models", get(list_models))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// No allow-list is configured by default, the same posture the voice
/// agent's CORS layer falls back to: permissive is acceptable here since
/// every route either is public-by-design (health/ready/metrics) or
/// requires the gateway's own bearer token.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "healthy", "version": env!("CARGO_PKG_VERSION")}))
}

async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.repository.list_candidates().await {
        Ok(candidates) => {
            let body = json!({"status": "ready", "eligible_models": candidates.len()});
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            let body = json!({"status": "not_ready", "error": e.to_string()});
            (StatusCode::SERVICE_UNAVAILABLE, Json(body))
        }
    }
}

/// `GET /v1/models`: the enabled, OpenAI-shaped model listing (§6), plus a
/// synthetic `auto` entry whenever at least one real model is enabled —
/// selecting it hands candidate selection to the dispatch engine's own
/// priority-ordered failover (§4.2) instead of naming one vendor.
async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ServerError> {
    let filter = ModelFilter { vendor: None, status: Some(llm_gateway_core::ModelStatus::Enabled) };
    let records = state.repository.list(filter).await?;

    let mut data: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            json!({
                "id": r.model_name,
                "object": "model",
                "created": r.create_time.timestamp(),
                "owned_by": r.vendor,
            })
        })
        .collect();

    if !data.is_empty() {
        data.insert(
            0,
            json!({"id": "auto", "object": "model", "created": chrono::Utc::now().timestamp(), "owned_by": "gateway"}),
        );
    }

    Ok(Json(json!({"object": "list", "data": data})))
}

/// `POST /v1/chat/completions`: dispatches through the engine and either
/// returns the unary JSON body or forwards the pre-formatted SSE frame
/// stream as-is — the stream already yields complete `"data: ...\n\n"`
/// strings (see `llm_gateway_adapters::stream`), so this does not re-wrap
/// them through axum's `Sse`/`Event` API, which would double the prefix.
async fn chat_completions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StandardRequest>,
) -> Result<Response, ServerError> {
    if request.messages.is_empty() {
        return Err(ServerError::InvalidRequest("messages must not be empty".to_string()));
    }
    crate::metrics::record_chat_request(request.wants_stream());

    match state.dispatch.dispatch(request).await {
        Ok(DispatchOutput::Unary(response)) => Ok(Json(response).into_response()),
        Ok(DispatchOutput::Stream(stream)) => Ok(streaming_response(stream)),
        Err(e) => {
            crate::metrics::record_chat_error(dispatch_error_kind(&e));
            Err(e.into())
        }
    }
}

fn dispatch_error_kind(err: &llm_gateway_dispatch::DispatchError) -> &'static str {
    use llm_gateway_dispatch::DispatchError;
    match err {
        DispatchError::NoAvailableModel => "no_available_model",
        DispatchError::AllUpstreamsFailed { .. } => "all_upstreams_failed",
        DispatchError::Adapter(_) => "adapter_error",
        DispatchError::Repository(_) => "repository_error",
        DispatchError::Client(_) => "client_error",
    }
}

fn streaming_response(stream: llm_gateway_client::LineStream) -> Response {
    let body_stream = stream.map(|item| item.map(Bytes::from));
    let body = Body::from_stream(body_stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header("x-accel-buffering", "no")
        .body(body)
        .expect("static headers always build a valid response")
}
