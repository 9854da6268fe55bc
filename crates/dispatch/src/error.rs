use thiserror::Error;

/// The terminal error taxonomy the core produces at its boundary (§7).
/// Per-attempt internal outcomes (`upstream_http_error`, `empty_response`,
/// `transport_error`, `validation_error`) never escape dispatch directly —
/// they're recorded as `DispatchAttempt`s and only surface wrapped inside
/// `AllUpstreamsFailed`'s detail once every candidate has been tried.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no available model for this request")]
    NoAvailableModel,

    #[error("all upstream candidates failed: {detail}")]
    AllUpstreamsFailed { detail: String },

    #[error("adapter error: {0}")]
    Adapter(#[from] llm_gateway_adapters::AdapterError),

    #[error("repository error: {0}")]
    Repository(#[from] llm_gateway_repository::RepositoryError),

    #[error("client error: {0}")]
    Client(#[from] llm_gateway_client::ClientError),
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;
