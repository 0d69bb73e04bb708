use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Unsupported link type: {0}")]
    UnsupportedLinkType(u32),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
