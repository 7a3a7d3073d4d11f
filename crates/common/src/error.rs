//! Common error types and handling for AreaPod

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the AreaPod tools
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Usage error: {0}")]
    Usage(String),
}

impl Error {
    /// Whether the error came from a malformed invocation
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}
