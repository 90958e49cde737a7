use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuantError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Index out of range: index {index} for a sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuantError>;

impl From<QuantError> for String {
    fn from(e: QuantError) -> Self {
        e.to_string()
    }
}
