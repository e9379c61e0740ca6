use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiachiError {
    #[error("Source error: {0}")]
    Source(#[from] diachi_sources::SourceError),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DiachiError>;
