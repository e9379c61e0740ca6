use thiserror::Error;

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Error, Debug)]
pub enum SourceError {
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected payload from data source: {0}")]
    UnexpectedPayload(#[from] serde_json::Error),
    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}
