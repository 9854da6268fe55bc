use thiserror::Error;

/// Errors shared across the gateway crates.
///
/// Each downstream crate defines its own richer error enum and converts into
/// this one at the boundary it crosses into `llm-gateway-core` types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown vendor tag: {0}")]
    UnknownVendor(String),

    #[error("unknown api_spec tag: {0}")]
    UnknownApiSpec(String),

    #[error("malformed standard request: {0}")]
    MalformedRequest(String),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
