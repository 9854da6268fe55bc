use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// The boundary error type the HTTP layer produces; everything from the
/// lower crates converts into this, the way `voice-agent`'s `ServerError`
/// absorbs `SessionError`/`WsError` at its own boundary.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("missing or malformed Authorization header")]
    Unauthorized,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Dispatch(#[from] llm_gateway_dispatch::DispatchError),

    #[error(transparent)]
    Repository(#[from] llm_gateway_repository::RepositoryError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Dispatch(llm_gateway_dispatch::DispatchError::NoAvailableModel) => StatusCode::SERVICE_UNAVAILABLE,
            // §7: `all_upstreams_failed` -> 500, not 502 — the gateway
            // itself failed to serve the request, it isn't relaying a
            // single upstream's bad gateway response.
            ServerError::Dispatch(llm_gateway_dispatch::DispatchError::AllUpstreamsFailed { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Dispatch(_) => StatusCode::BAD_GATEWAY,
            ServerError::Repository(llm_gateway_repository::RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Repository(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        let body = Json(json!({"error": {"message": self.to_string(), "type": error_type(&self)}}));
        (status, body).into_response()
    }
}

fn error_type(err: &ServerError) -> &'static str {
    match err {
        ServerError::Unauthorized => "authentication_error",
        ServerError::InvalidRequest(_) => "invalid_request_error",
        ServerError::Dispatch(llm_gateway_dispatch::DispatchError::NoAvailableModel) => "no_available_model",
        ServerError::Dispatch(_) => "upstream_error",
        ServerError::Repository(_) => "repository_error",
        ServerError::Internal(_) => "internal_error",
    }
}
