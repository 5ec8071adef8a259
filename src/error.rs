use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZoomreelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Media probe error: {0}")]
    Probe(String),
}

pub type Result<T> = std::result::Result<T, ZoomreelError>;
