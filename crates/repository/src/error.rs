use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("model record {0} not found")]
    NotFound(u64),

    #[error("a model with vendor={vendor} model_name={model_name} already exists")]
    DuplicateVendorModel { vendor: String, model_name: String },
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;
