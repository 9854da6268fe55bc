use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("invalid header name or value: {0}")]
    InvalidHeader(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
