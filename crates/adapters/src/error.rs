use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("unknown vendor tag: {0}")]
    UnknownVendor(String),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;
